//! Account-activation verification records

pub mod entity;
pub mod repository;

pub use entity::{NewVerification, VerificationRecord};
pub use repository::VerificationRepository;
