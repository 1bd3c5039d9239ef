//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountId;

/// Team identifier, assigned by the record store at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields for a team about to be persisted. The store assigns the id and
/// registers the owner as the first member in the same atomic unit.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub owner: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Team entity.
///
/// Membership is a many-to-many kept by the repository, not a field here.
/// The owner reference is nullable so a team survives its owner's deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Store-assigned identifier
    id: TeamId,
    /// Display name
    name: String,
    /// Description
    description: String,
    /// Owning account; None once the owner account is deleted
    owner: Option<AccountId>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Team {
    pub fn from_new(id: TeamId, new: NewTeam) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            owner: Some(new.owner),
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    // Getters

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner(&self) -> Option<AccountId> {
        self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the given account owns this team
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.owner == Some(account)
    }

    // Mutators

    /// Detach the owner reference; membership rows are untouched
    pub fn clear_owner(&mut self) {
        self.owner = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
