//! Domain layer - Core business logic and entities

pub mod account;
pub mod clock;
pub mod error;
pub mod expiry;
pub mod invitation;
pub mod notifier;
pub mod team;
pub mod verification;

pub use account::{
    validate_handle, validate_password, Account, AccountId, AccountRepository, NewAccount,
};
pub use clock::{Clock, SystemClock};
pub use error::DomainError;
pub use expiry::{expiry_cutoff, is_expired};
pub use invitation::{
    InvitationId, InvitationRepository, InvitationStatus, NewInvitation, TeamInvitation,
};
pub use notifier::{NotificationContext, NotificationTemplate, Notifier, NotifierError};
pub use team::{validate_team_name, NewTeam, Team, TeamId, TeamRepository};
pub use verification::{NewVerification, VerificationRecord, VerificationRepository};
