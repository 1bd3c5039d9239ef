//! Registration and login orchestration

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::domain::account::{
    validate_email, validate_handle, validate_password, Account, AccountRepository, NewAccount,
};
use crate::domain::clock::Clock;
use crate::domain::invitation::TeamInvitation;
use crate::domain::team::TeamRepository;
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::invitation::InvitationService;
use crate::infrastructure::verification::VerificationService;

use super::password::PasswordHasher;

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub handle: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    /// Redeeming a valid invite code activates the account immediately and
    /// joins the inviter's team
    pub invite_code: Option<String>,
}

/// A successful login: the bearer token and the authenticated account
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

/// Account service for registration and login
#[derive(Debug)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    teams: Arc<dyn TeamRepository>,
    verification: Arc<VerificationService>,
    invitations: Arc<InvitationService>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn JwtGenerator>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl AccountService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        teams: Arc<dyn TeamRepository>,
        verification: Arc<VerificationService>,
        invitations: Arc<InvitationService>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn JwtGenerator>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            accounts,
            teams,
            verification,
            invitations,
            hasher,
            tokens,
            clock,
            config,
        }
    }

    /// Register a new account.
    ///
    /// All validation and conflict checks run before anything is written.
    /// Without an invite code the account starts inactive and waits for the
    /// activation email. With a valid code it starts active, joins the
    /// inviter's team and the invitation is accepted. Either way, every
    /// other pending invitation for this email is declined afterwards.
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, DomainError> {
        validate_handle(&request.handle).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password, self.config.password_min_length)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if request.password != request.password_confirm {
            return Err(DomainError::validation("Passwords do not match"));
        }

        if self.accounts.handle_exists(&request.handle).await? {
            return Err(DomainError::conflict(format!(
                "Handle '{}' already exists",
                request.handle
            )));
        }

        if self.accounts.email_exists(&request.email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                request.email
            )));
        }

        let invitation = match &request.invite_code {
            Some(code) => Some(self.invitations.validate_code(&request.email, code).await?),
            None => None,
        };

        let password_hash = self.hasher.hash(&request.password)?;

        let (account, _record) = self
            .verification
            .create_and_send(NewAccount {
                handle: request.handle.clone(),
                email: request.email.clone(),
                password_hash,
                active: invitation.is_some(),
                created_at: self.clock.now(),
            })
            .await?;

        if let Some(invitation) = invitation {
            self.join_inviter_team(&account, &invitation).await;

            if !self.invitations.accept(&invitation).await? {
                warn!(
                    invitation_id = %invitation.id(),
                    "Invitation was no longer pending at acceptance"
                );
            }
        }

        self.invitations
            .decline_competing(std::slice::from_ref(&request.email))
            .await?;

        info!(handle = %account.handle(), account_id = %account.id(), "Account registered");
        Ok(account)
    }

    /// Enroll a fresh registrant into the inviter's current team. Best
    /// effort: a vanished inviter or team downgrades to a plain
    /// registration.
    async fn join_inviter_team(&self, account: &Account, invitation: &TeamInvitation) {
        let Some(inviter) = invitation.invited_by() else {
            warn!(
                invitation_id = %invitation.id(),
                "Inviter account no longer exists, skipping team join"
            );
            return;
        };

        match self.teams.team_of(inviter).await {
            Ok(Some(team)) => {
                if let Err(e) = self.teams.add_member(team.id(), account.id()).await {
                    warn!(
                        team_id = %team.id(),
                        handle = %account.handle(),
                        error = %e,
                        "Failed to join inviter's team"
                    );
                }
            }
            Ok(None) => {
                warn!(
                    invitation_id = %invitation.id(),
                    "Inviter has no team, skipping team join"
                );
            }
            Err(e) => {
                warn!(invitation_id = %invitation.id(), error = %e, "Team lookup failed");
            }
        }
    }

    /// Authenticate by handle or email.
    ///
    /// Returns `None` for an unknown identifier, a wrong password or an
    /// inactive account; records the login and returns the refreshed
    /// account otherwise.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<Account>, DomainError> {
        let account = match self.accounts.get_by_handle(identifier).await? {
            Some(account) => Some(account),
            None => self.accounts.get_by_email(identifier).await?,
        };

        let Some(account) = account else {
            return Ok(None);
        };

        if !account.is_active() {
            return Ok(None);
        }

        if !self.hasher.verify(password, account.password_hash()) {
            return Ok(None);
        }

        self.accounts.record_login(account.id()).await?;

        self.accounts.get(account.id()).await
    }

    /// Authenticate and issue a bearer token
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session, DomainError> {
        let Some(account) = self.authenticate(identifier, password).await? else {
            return Err(DomainError::validation("Invalid credentials"));
        };

        let token = self.tokens.generate(&account)?;

        info!(handle = %account.handle(), "Login succeeded");
        Ok(Session { token, account })
    }
}
