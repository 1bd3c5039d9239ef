//! Verification repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::VerificationRecord;
use crate::domain::account::{Account, AccountId, NewAccount};
use crate::domain::DomainError;

/// Repository owning the account+verification-record pair lifecycle.
///
/// Creation, key consumption and purge each execute as one atomic unit
/// against the store; concurrent callers observe either the state before or
/// the state after, never an intermediate one.
#[async_trait]
pub trait VerificationRepository: Send + Sync + Debug {
    /// Create an account and its verification record atomically.
    ///
    /// Fails with a conflict when the handle, a non-blank email, or the key
    /// collides with an existing row.
    async fn create_with_account(
        &self,
        account: NewAccount,
        key: &str,
    ) -> Result<(Account, VerificationRecord), DomainError>;

    /// Look up the record and its account by exact key
    async fn get_by_key(
        &self,
        key: &str,
    ) -> Result<Option<(Account, VerificationRecord)>, DomainError>;

    /// Look up the record for an account
    async fn get_by_account(
        &self,
        id: AccountId,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Check whether a key is already stored
    async fn key_exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Atomically consume `key`: swap it for the sentinel, mark the record
    /// verified and the account active. Returns the activated account, or
    /// `None` when the key no longer matches (absent or already consumed) -
    /// the loser of a concurrent activation race lands here.
    async fn consume_key(&self, key: &str) -> Result<Option<Account>, DomainError>;

    /// Ids of inactive accounts with an unconsumed key created at or before
    /// `cutoff`
    async fn find_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<AccountId>, DomainError>;

    /// Delete the account and its record as one unit; each call is its own
    /// transaction so a sweep can make partial progress. Returns false when
    /// the account is already gone.
    async fn purge(&self, id: AccountId) -> Result<bool, DomainError>;
}
