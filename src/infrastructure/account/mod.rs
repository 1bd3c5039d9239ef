//! Account registration, authentication and password hashing

pub mod password;
pub mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{AccountService, RegisterRequest, Session};
