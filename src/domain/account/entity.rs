//! Account entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account identifier, assigned by the record store at creation.
///
/// Numeric on purpose: password-reset links carry the base36-encoded id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields for an account about to be persisted.
///
/// The store assigns the id and creates the verification record in the same
/// atomic unit, so accounts are never created through a bare insert.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier
    id: AccountId,
    /// Unique login handle
    handle: String,
    /// Unique email address; may be blank on imported rows and a blank
    /// email never matches an email lookup
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    /// Whether the account may log in; false until email verification
    /// or invite redemption
    active: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
    /// Last login timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Materialize an account from its new-account fields and a store id
    pub fn from_new(id: AccountId, new: NewAccount) -> Self {
        Self {
            id,
            handle: new.handle,
            email: new.email,
            password_hash: new.password_hash,
            active: new.active,
            created_at: new.created_at,
            updated_at: new.created_at,
            last_login_at: None,
        }
    }

    // Getters

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    // Mutators

    /// Mark the account as allowed to log in
    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    /// Replace the password hash; invalidates outstanding reset tokens
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Record a login
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
