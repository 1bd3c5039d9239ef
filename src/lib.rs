//! Teamgate
//!
//! A user-account and team-membership backend:
//! - Registration with single-use email verification keys
//! - Login issuing JWT bearer tokens
//! - Password reset via signed, stateless, time-limited tokens
//! - Team creation and invitation workflows with expiring invite codes
//!
//! HTTP routing, serialization and email delivery live outside this crate;
//! the services here are driven by an API layer and talk to a `Notifier`
//! collaborator for outbound mail.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;

use config::AuthConfig;
use domain::account::AccountRepository;
use domain::clock::{Clock, SystemClock};
use domain::invitation::InvitationRepository;
use domain::notifier::Notifier;
use domain::team::TeamRepository;
use domain::verification::VerificationRepository;
use infrastructure::account::{AccountService, Argon2Hasher, PasswordHasher};
use infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
use infrastructure::invitation::InvitationService;
use infrastructure::notifier::LogNotifier;
use infrastructure::password_reset::{PasswordResetService, ResetTokenGenerator};
use infrastructure::storage::{InMemoryAuthStore, InMemoryInvitationStore, InMemoryTeamStore};
use infrastructure::team::TeamService;
use infrastructure::verification::VerificationService;

/// All services wired together
pub struct AuthSystem {
    pub accounts: Arc<AccountService>,
    pub verification: Arc<VerificationService>,
    pub password_reset: Arc<PasswordResetService>,
    pub invitations: Arc<InvitationService>,
    pub teams: Arc<TeamService>,
}

/// Create the auth system from configuration files and environment
pub fn create_auth_system() -> anyhow::Result<AuthSystem> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    Ok(create_auth_system_with_config(&config))
}

/// Create the auth system with the given configuration, backed by in-memory
/// stores, Argon2 hashing and the logging notifier
pub fn create_auth_system_with_config(config: &AppConfig) -> AuthSystem {
    let auth_store = Arc::new(InMemoryAuthStore::new());
    let team_store = Arc::new(InMemoryTeamStore::new());
    let invitation_store = Arc::new(InMemoryInvitationStore::new());

    let accounts: Arc<dyn AccountRepository> = auth_store.clone();
    let verification_store: Arc<dyn VerificationRepository> = auth_store;
    let teams: Arc<dyn TeamRepository> = team_store;
    let invitations: Arc<dyn InvitationRepository> = invitation_store;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    let secret = resolve_secret(&config.auth);
    let jwt: Arc<dyn JwtGenerator> = Arc::new(JwtService::new(JwtConfig::new(
        secret.clone(),
        u64::from(config.auth.jwt_expiration_hours),
    )));
    let reset_tokens = ResetTokenGenerator::new(secret, config.auth.reset_token_validity_days);

    let verification = Arc::new(VerificationService::new(
        verification_store,
        notifier.clone(),
        clock.clone(),
        config.auth.clone(),
    ));

    let invitation_service = Arc::new(InvitationService::new(
        invitations,
        teams.clone(),
        accounts.clone(),
        notifier.clone(),
        clock.clone(),
        config.auth.clone(),
    ));

    let password_reset = Arc::new(PasswordResetService::new(
        accounts.clone(),
        notifier,
        clock.clone(),
        hasher.clone(),
        reset_tokens,
        config.auth.clone(),
    ));

    let account_service = Arc::new(AccountService::new(
        accounts,
        teams.clone(),
        verification.clone(),
        invitation_service.clone(),
        hasher,
        jwt,
        clock.clone(),
        config.auth.clone(),
    ));

    let team_service = Arc::new(TeamService::new(teams, clock));

    AuthSystem {
        accounts: account_service,
        verification,
        password_reset,
        invitations: invitation_service,
        teams: team_service,
    }
}

/// Resolve the signing secret: config, then JWT_SECRET env var, then a
/// random value
fn resolve_secret(auth: &AuthConfig) -> String {
    auth.jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            tracing::warn!(
                "No jwt_secret configured and JWT_SECRET is unset. Generating a random \
                secret; sessions and reset links will not survive a restart."
            );
            generate_random_secret()
        })
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
