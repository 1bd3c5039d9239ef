//! In-memory account + verification-record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountId, AccountRepository, NewAccount};
use crate::domain::verification::{
    NewVerification, VerificationRecord, VerificationRepository,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct AuthStoreInner {
    next_id: i64,
    accounts: HashMap<i64, Account>,
    records: HashMap<i64, VerificationRecord>,
    /// handle -> account id
    handle_index: HashMap<String, i64>,
    /// non-blank email -> account id
    email_index: HashMap<String, i64>,
    /// unconsumed verification key -> account id
    key_index: HashMap<String, i64>,
}

/// In-memory implementation of [`AccountRepository`] and
/// [`VerificationRepository`].
///
/// Accounts and verification records share one lock so the pair mutations
/// (create, consume, purge) are atomic with respect to every reader.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    inner: Arc<RwLock<AuthStoreInner>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationRepository for InMemoryAuthStore {
    async fn create_with_account(
        &self,
        account: NewAccount,
        key: &str,
    ) -> Result<(Account, VerificationRecord), DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if inner.handle_index.contains_key(&account.handle) {
            return Err(DomainError::conflict(format!(
                "Handle '{}' already exists",
                account.handle
            )));
        }

        if !account.email.is_empty() && inner.email_index.contains_key(&account.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                account.email
            )));
        }

        if inner.key_index.contains_key(key) {
            return Err(DomainError::conflict(
                "Verification key already in use".to_string(),
            ));
        }

        inner.next_id += 1;
        let id = AccountId::new(inner.next_id);

        let created_at = account.created_at;
        let handle = account.handle.clone();
        let email = account.email.clone();

        let entity = Account::from_new(id, account);
        let record = VerificationRecord::new(
            id,
            NewVerification {
                key: key.to_string(),
                created_at,
            },
        );

        inner.handle_index.insert(handle, id.value());
        if !email.is_empty() {
            inner.email_index.insert(email, id.value());
        }
        inner.key_index.insert(key.to_string(), id.value());
        inner.accounts.insert(id.value(), entity.clone());
        inner.records.insert(id.value(), record.clone());

        Ok((entity, record))
    }

    async fn get_by_key(
        &self,
        key: &str,
    ) -> Result<Option<(Account, VerificationRecord)>, DomainError> {
        let inner = self.inner.read().await;

        let Some(&account_id) = inner.key_index.get(key) else {
            return Ok(None);
        };

        match (inner.accounts.get(&account_id), inner.records.get(&account_id)) {
            (Some(account), Some(record)) => Ok(Some((account.clone(), record.clone()))),
            _ => Err(DomainError::storage(format!(
                "Verification key index points at missing account {account_id}"
            ))),
        }
    }

    async fn get_by_account(
        &self,
        id: AccountId,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(&id.value()).cloned())
    }

    async fn key_exists(&self, key: &str) -> Result<bool, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.key_index.contains_key(key))
    }

    async fn consume_key(&self, key: &str) -> Result<Option<Account>, DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        // Removing the index entry under the write lock is the
        // compare-and-consume: a racing caller finds nothing to remove.
        let Some(account_id) = inner.key_index.remove(key) else {
            return Ok(None);
        };

        let Some(record) = inner.records.get_mut(&account_id) else {
            return Err(DomainError::storage(format!(
                "Verification record missing for account {account_id}"
            )));
        };
        record.consume();

        let Some(account) = inner.accounts.get_mut(&account_id) else {
            return Err(DomainError::storage(format!(
                "Account {account_id} missing for verification record"
            )));
        };
        account.activate();

        Ok(Some(account.clone()))
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<AccountId>, DomainError> {
        let inner = self.inner.read().await;

        let expired = inner
            .records
            .values()
            .filter(|record| !record.is_consumed())
            .filter_map(|record| inner.accounts.get(&record.account_id().value()))
            .filter(|account| !account.is_active() && account.created_at() <= cutoff)
            .map(|account| account.id())
            .collect();

        Ok(expired)
    }

    async fn purge(&self, id: AccountId) -> Result<bool, DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let Some(account) = inner.accounts.remove(&id.value()) else {
            return Ok(false);
        };

        inner.handle_index.remove(account.handle());
        if !account.email().is_empty() {
            inner.email_index.remove(account.email());
        }

        if let Some(record) = inner.records.remove(&id.value()) {
            if !record.is_consumed() {
                inner.key_index.remove(record.key());
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAuthStore {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.get(&id.value()).cloned())
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<Account>, DomainError> {
        let inner = self.inner.read().await;

        if let Some(id) = inner.handle_index.get(handle) {
            return Ok(inner.accounts.get(id).cloned());
        }

        Ok(None)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        if email.is_empty() {
            return Ok(None);
        }

        let inner = self.inner.read().await;

        if let Some(id) = inner.email_index.get(email) {
            return Ok(inner.accounts.get(id).cloned());
        }

        Ok(None)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let id = account.id().value();

        let Some(stored) = inner.accounts.get(&id) else {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        };

        // Handles and emails are immutable after registration; refuse an
        // update that would desynchronize the indexes.
        if stored.handle() != account.handle() || stored.email() != account.email() {
            return Err(DomainError::storage(
                "Handle and email cannot be changed through update".to_string(),
            ));
        }

        inner.accounts.insert(id, account.clone());
        Ok(account.clone())
    }

    async fn existing_emails(&self, emails: &[String]) -> Result<Vec<String>, DomainError> {
        let inner = self.inner.read().await;

        let existing = emails
            .iter()
            .filter(|email| !email.is_empty() && inner.email_index.contains_key(*email))
            .cloned()
            .collect();

        Ok(existing)
    }

    async fn record_login(&self, id: AccountId) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;

        if let Some(account) = inner.accounts.get_mut(&id.value()) {
            account.record_login(Utc::now());
            Ok(())
        } else {
            Err(DomainError::not_found(format!(
                "Account '{id}' not found"
            )))
        }
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.len())
    }
}
