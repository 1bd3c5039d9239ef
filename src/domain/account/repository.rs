//! Account repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Repository trait for account storage.
///
/// Accounts are created through
/// [`VerificationRepository::create_with_account`](crate::domain::verification::VerificationRepository::create_with_account)
/// so the account and its verification record always land in one atomic unit;
/// this trait covers lookup and mutation of existing rows.
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    /// Get an account by its id
    async fn get(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    /// Get an account by its handle (for login)
    async fn get_by_handle(&self, handle: &str) -> Result<Option<Account>, DomainError>;

    /// Get an account by email. A blank email never matches.
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Update an existing account
    async fn update(&self, account: &Account) -> Result<Account, DomainError>;

    /// Check if a handle is taken
    async fn handle_exists(&self, handle: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_handle(handle).await?.is_some())
    }

    /// Check if an email is bound to an account
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Of the given emails, return those already bound to accounts
    async fn existing_emails(&self, emails: &[String]) -> Result<Vec<String>, DomainError>;

    /// Record a login for an account
    async fn record_login(&self, id: AccountId) -> Result<(), DomainError>;

    /// Count stored accounts
    async fn count(&self) -> Result<usize, DomainError>;
}
