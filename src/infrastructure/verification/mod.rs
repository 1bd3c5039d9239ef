//! Account activation key lifecycle

pub mod service;

pub use service::VerificationService;
