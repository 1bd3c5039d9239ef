//! Infrastructure layer - services, token machinery, stores and adapters

pub mod account;
pub mod auth;
pub mod invitation;
pub mod logging;
pub mod notifier;
pub mod password_reset;
pub mod storage;
pub mod team;
pub mod token;
pub mod verification;

pub use account::{AccountService, Argon2Hasher, PasswordHasher, RegisterRequest, Session};
pub use auth::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
pub use invitation::InvitationService;
pub use notifier::LogNotifier;
pub use password_reset::{PasswordResetService, ResetConfirmRequest, ResetTokenGenerator};
pub use storage::{InMemoryAuthStore, InMemoryInvitationStore, InMemoryTeamStore};
pub use team::{CreateTeamRequest, TeamService};
pub use verification::VerificationService;
