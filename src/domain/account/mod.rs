//! Account entity, validation and repository contract

pub mod entity;
pub mod repository;
pub mod validation;

pub use entity::{Account, AccountId, NewAccount};
pub use repository::AccountRepository;
pub use validation::{
    validate_email, validate_handle, validate_password, AccountValidationError,
};
