//! Team invite-code lifecycle

pub mod service;

pub use service::InvitationService;
