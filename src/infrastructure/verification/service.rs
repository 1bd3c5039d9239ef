//! Verification key lifecycle: derive-on-create, single-use activation,
//! expiry sweep

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::domain::account::{Account, NewAccount};
use crate::domain::clock::Clock;
use crate::domain::expiry::{expiry_cutoff, is_expired};
use crate::domain::notifier::{NotificationContext, NotificationTemplate, Notifier};
use crate::domain::verification::{VerificationRecord, VerificationRepository};
use crate::domain::DomainError;
use crate::infrastructure::token::{derive_verification_key, is_well_formed_key};

const MAX_KEY_ATTEMPTS: usize = 5;

/// Service owning activation keys from derivation to consumption or purge
#[derive(Debug)]
pub struct VerificationService {
    store: Arc<dyn VerificationRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn VerificationRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    /// Create an account with its verification record and request the
    /// activation email.
    ///
    /// The account+record insert is one atomic unit; the notification is
    /// requested after commit and a failing notifier is logged, never
    /// propagated.
    pub async fn create_and_send(
        &self,
        account: NewAccount,
    ) -> Result<(Account, VerificationRecord), DomainError> {
        let (account, record) = self.create_with_unique_key(account).await?;

        let mut context = NotificationContext::new();
        context.insert(
            "verification_key".to_string(),
            record.key().to_string(),
        );
        context.insert(
            "expiration_days".to_string(),
            self.config.verification_key_expiry_days.to_string(),
        );
        context.insert("handle".to_string(), account.handle().to_string());

        if let Err(e) = self
            .notifier
            .send(NotificationTemplate::ActivationEmail, context, account.email())
            .await
        {
            warn!(handle = %account.handle(), error = %e, "Failed to request activation email");
        }

        info!(handle = %account.handle(), account_id = %account.id(), "Account created pending verification");
        Ok((account, record))
    }

    async fn create_with_unique_key(
        &self,
        account: NewAccount,
    ) -> Result<(Account, VerificationRecord), DomainError> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key = derive_verification_key(&account.handle);

            if self.store.key_exists(&key).await? {
                continue;
            }

            match self.store.create_with_account(account.clone(), &key).await {
                Ok(pair) => return Ok(pair),
                // a racing insert took this key; any other conflict is real
                Err(DomainError::Conflict { .. }) if self.store.key_exists(&key).await? => {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::internal(
            "Could not derive a unique verification key",
        ))
    }

    /// Consume a verification key and activate its account.
    ///
    /// Input that does not match the 40-hex key shape is rejected without a
    /// lookup, which also makes the consumed sentinel unreachable. A key
    /// past the expiry window reports expired without mutating anything.
    /// Two concurrent calls with the same key activate at most once: the
    /// loser's compare-and-consume fails and reports not-found.
    pub async fn activate(&self, key: &str) -> Result<Account, DomainError> {
        if !is_well_formed_key(key) {
            return Err(DomainError::not_found("Verification key is not valid"));
        }

        let Some((account, record)) = self.store.get_by_key(key).await? else {
            return Err(DomainError::not_found("Verification key is not valid"));
        };

        if !record.is_consumed()
            && is_expired(
                account.created_at(),
                self.config.verification_key_expiry_days,
                self.clock.now(),
            )
        {
            return Err(DomainError::expired("Verification key has expired"));
        }

        match self.store.consume_key(key).await? {
            Some(account) => {
                info!(handle = %account.handle(), account_id = %account.id(), "Account activated");
                Ok(account)
            }
            None => Err(DomainError::not_found("Verification key is not valid")),
        }
    }

    /// Delete every inactive account whose key expired without being
    /// consumed. Each account+record pair is purged in its own store call so
    /// one failure does not abort the batch.
    pub async fn sweep_expired(&self) -> Result<usize, DomainError> {
        let cutoff = expiry_cutoff(self.clock.now(), self.config.verification_key_expiry_days);
        let expired = self.store.find_expired(cutoff).await?;

        let mut purged = 0;
        for account_id in expired {
            match self.store.purge(account_id).await {
                Ok(true) => purged += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(account_id = %account_id, error = %e, "Failed to purge expired account, continuing");
                }
            }
        }

        info!(purged, "Expired unverified accounts swept");
        Ok(purged)
    }
}
