//! Password reset via signed, time-limited, stateless tokens

pub mod service;
pub mod token;

pub use service::{PasswordResetService, ResetConfirmRequest};
pub use token::ResetTokenGenerator;
