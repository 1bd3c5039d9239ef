//! Team invitations and invite-code lifecycle

pub mod entity;
pub mod repository;

pub use entity::{InvitationId, InvitationStatus, NewInvitation, TeamInvitation};
pub use repository::InvitationRepository;
