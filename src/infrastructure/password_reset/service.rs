//! Password reset request / validate / confirm flow

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::domain::account::{validate_password, Account, AccountId, AccountRepository};
use crate::domain::clock::Clock;
use crate::domain::notifier::{NotificationContext, NotificationTemplate, Notifier};
use crate::domain::DomainError;
use crate::infrastructure::account::PasswordHasher;
use crate::infrastructure::token::{decode_base36, encode_base36};

use super::token::ResetTokenGenerator;

const INVALID_LINK: &str = "Password reset link is not valid";

/// Request to set a new password through a reset link
#[derive(Debug, Clone)]
pub struct ResetConfirmRequest {
    /// base36-encoded account id from the link
    pub uid: String,
    /// signed token from the link
    pub token: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Service around stateless reset tokens
#[derive(Debug)]
pub struct PasswordResetService {
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: ResetTokenGenerator,
    config: AuthConfig,
}

impl PasswordResetService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: ResetTokenGenerator,
        config: AuthConfig,
    ) -> Self {
        Self {
            accounts,
            notifier,
            clock,
            hasher,
            tokens,
            config,
        }
    }

    /// Request a reset email.
    ///
    /// Always reports success: whether the email belongs to an account must
    /// not be observable through this endpoint. Lookup and dispatch failures
    /// are logged and swallowed for the same reason.
    pub async fn request(&self, email: &str) -> Result<(), DomainError> {
        let account = match self.accounts.get_by_email(email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!("Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Password reset lookup failed");
                return Ok(());
            }
        };

        let token = match self.tokens.make_token(&account, self.clock.now()) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to issue password reset token");
                return Ok(());
            }
        };

        let mut context = NotificationContext::new();
        context.insert("uid".to_string(), encode_base36(account.id().value()));
        context.insert("token".to_string(), token);
        context.insert("handle".to_string(), account.handle().to_string());

        if let Err(e) = self
            .notifier
            .send(NotificationTemplate::PasswordResetEmail, context, email)
            .await
        {
            warn!(error = %e, "Failed to request password reset email");
        }

        Ok(())
    }

    /// Resolve a reset link to its account.
    ///
    /// Decode failures, unknown ids, signature mismatches and expired
    /// windows all collapse into the same error.
    pub async fn validate(&self, uid: &str, token: &str) -> Result<Account, DomainError> {
        let id = decode_base36(uid).map_err(|_| DomainError::not_found(INVALID_LINK))?;

        let account = self
            .accounts
            .get(AccountId::new(id))
            .await?
            .ok_or_else(|| DomainError::not_found(INVALID_LINK))?;

        if !self.tokens.check_token(&account, token, self.clock.now()) {
            return Err(DomainError::not_found(INVALID_LINK));
        }

        Ok(account)
    }

    /// Set a new password through a valid reset link.
    ///
    /// The stored hash changes, so every token issued before this call is
    /// dead afterwards.
    pub async fn confirm(&self, request: ResetConfirmRequest) -> Result<Account, DomainError> {
        if request.new_password != request.new_password_confirm {
            return Err(DomainError::validation("Passwords do not match"));
        }

        validate_password(&request.new_password, self.config.password_min_length)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut account = self.validate(&request.uid, &request.token).await?;

        let hash = self.hasher.hash(&request.new_password)?;
        account.set_password_hash(hash);

        self.accounts.update(&account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::NewAccount;
    use crate::domain::clock::mock::FixedClock;
    use crate::domain::notifier::mock::RecordingNotifier;
    use crate::domain::verification::VerificationRepository;
    use crate::infrastructure::account::password::mock::PlainHasher;
    use crate::infrastructure::storage::InMemoryAuthStore;
    use chrono::Utc;

    struct Harness {
        service: PasswordResetService,
        store: Arc<InMemoryAuthStore>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<FixedClock>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryAuthStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let config = AuthConfig::default();

        let service = PasswordResetService::new(
            store.clone(),
            notifier.clone(),
            clock.clone(),
            Arc::new(PlainHasher),
            ResetTokenGenerator::new("test-secret", config.reset_token_validity_days),
            config,
        );

        Harness {
            service,
            store,
            notifier,
            clock,
        }
    }

    async fn seed_account(h: &Harness, handle: &str) -> Account {
        let (account, _) = h
            .store
            .create_with_account(
                NewAccount {
                    handle: handle.to_string(),
                    email: format!("{handle}@example.com"),
                    password_hash: format!("plain$secret-{handle}"),
                    active: true,
                    created_at: h.clock.now(),
                },
                &"a".repeat(40),
            )
            .await
            .unwrap();
        account
    }

    fn sent_link(h: &Harness) -> (String, String) {
        let sent = h.notifier.sent();
        let context = &sent[sent.len() - 1].context;
        (
            context.get("uid").unwrap().clone(),
            context.get("token").unwrap().clone(),
        )
    }

    #[tokio::test]
    async fn test_request_sends_reset_email() {
        let h = harness();
        let account = seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, NotificationTemplate::PasswordResetEmail);
        assert_eq!(sent[0].recipient, "alice@example.com");

        let (uid, _) = sent_link(&h);
        assert_eq!(decode_base36(&uid).unwrap(), account.id().value());
    }

    #[tokio::test]
    async fn test_request_unknown_email_reports_success_silently() {
        let h = harness();
        seed_account(&h, "alice").await;

        let result = h.service.request("nobody@example.com").await;

        assert!(result.is_ok());
        assert_eq!(h.notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let h = harness();
        let account = seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        let resolved = h.service.validate(&uid, &token).await.unwrap();
        assert_eq!(resolved.id(), account.id());
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_uid() {
        let h = harness();
        seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (_, token) = sent_link(&h);

        assert!(h.service.validate("!!!", &token).await.is_err());
        assert!(h.service.validate("ZZZZ", &token).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_expired_token() {
        let h = harness();
        seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        h.clock.advance_days(4);

        let result = h.service.validate(&uid, &token).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_confirm_changes_password() {
        let h = harness();
        let account = seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        h.service
            .confirm(ResetConfirmRequest {
                uid,
                token,
                new_password: "brand-new-password".to_string(),
                new_password_confirm: "brand-new-password".to_string(),
            })
            .await
            .unwrap();

        let stored = h.store.get(account.id()).await.unwrap().unwrap();
        assert_eq!(stored.password_hash(), "plain$brand-new-password");
    }

    #[tokio::test]
    async fn test_old_token_dies_with_password_change() {
        let h = harness();
        seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        h.service
            .confirm(ResetConfirmRequest {
                uid: uid.clone(),
                token: token.clone(),
                new_password: "brand-new-password".to_string(),
                new_password_confirm: "brand-new-password".to_string(),
            })
            .await
            .unwrap();

        // the very token that performed the reset is now invalid
        let result = h.service.validate(&uid, &token).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_confirm_rejects_password_mismatch() {
        let h = harness();
        seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        let result = h
            .service
            .confirm(ResetConfirmRequest {
                uid,
                token,
                new_password: "brand-new-password".to_string(),
                new_password_confirm: "different-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_confirm_rejects_short_password() {
        let h = harness();
        seed_account(&h, "alice").await;

        h.service.request("alice@example.com").await.unwrap();
        let (uid, token) = sent_link(&h);

        let result = h
            .service
            .confirm(ResetConfirmRequest {
                uid,
                token,
                new_password: "short".to_string(),
                new_password_confirm: "short".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
