//! Verification record entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountId;

/// Fields for a verification record about to be persisted alongside its
/// account
#[derive(Debug, Clone)]
pub struct NewVerification {
    pub key: String,
    pub created_at: DateTime<Utc>,
}

/// One-to-one companion of an [`Account`](crate::domain::account::Account)
/// holding the activation key.
///
/// The key is either a 40-char lowercase hex token or the consumed sentinel.
/// Consumption swaps the key for the sentinel, which can never match the hex
/// pattern again; that swap is the single-use guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Owning account
    account_id: AccountId,
    /// Activation key, or [`VerificationRecord::ACTIVATED`] once consumed
    key: String,
    /// Whether the email address has been verified
    verified: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Sentinel stored in place of a consumed key
    pub const ACTIVATED: &'static str = "ALREADY ACTIVATED";

    pub fn new(account_id: AccountId, new: NewVerification) -> Self {
        Self {
            account_id,
            key: new.key,
            verified: false,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    // Getters

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the key has already been consumed
    pub fn is_consumed(&self) -> bool {
        self.key == Self::ACTIVATED
    }

    /// Consume the key: replace it with the sentinel and mark verified.
    /// Returns false if the key was already consumed.
    pub fn consume(&mut self) -> bool {
        if self.is_consumed() {
            return false;
        }

        self.key = Self::ACTIVATED.to_string();
        self.verified = true;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(key: &str) -> VerificationRecord {
        VerificationRecord::new(
            AccountId::new(1),
            NewVerification {
                key: key.to_string(),
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn test_record_creation() {
        let record = make_record("aaaabbbbccccddddeeeeffff0000111122223333");

        assert_eq!(record.account_id().value(), 1);
        assert!(!record.is_verified());
        assert!(!record.is_consumed());
    }

    #[test]
    fn test_consume() {
        let mut record = make_record("aaaabbbbccccddddeeeeffff0000111122223333");

        assert!(record.consume());
        assert_eq!(record.key(), VerificationRecord::ACTIVATED);
        assert!(record.is_verified());
        assert!(record.is_consumed());
    }

    #[test]
    fn test_double_consume_is_rejected() {
        let mut record = make_record("aaaabbbbccccddddeeeeffff0000111122223333");

        assert!(record.consume());
        assert!(!record.consume());
    }
}
