//! Team invitation entity and status state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountId;

/// Invitation identifier, assigned by the record store at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationId(i64);

impl InvitationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation lifecycle status.
///
/// `Pending` is the only state with outgoing transitions; the other three
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Fields for an invitation about to be persisted
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub invited_by: Option<AccountId>,
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Team invitation entity. `(email, code)` is unique across all rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInvitation {
    /// Store-assigned identifier
    id: InvitationId,
    /// Inviting account; None once the inviter is deleted
    invited_by: Option<AccountId>,
    /// Invited email address
    email: String,
    /// 25-char URL-safe invite code
    code: String,
    /// Lifecycle status
    status: InvitationStatus,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl TeamInvitation {
    pub fn from_new(id: InvitationId, new: NewInvitation) -> Self {
        Self {
            id,
            invited_by: new.invited_by,
            email: new.email,
            code: new.code,
            status: InvitationStatus::Pending,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }

    // Getters

    pub fn id(&self) -> InvitationId {
        self.id
    }

    pub fn invited_by(&self) -> Option<AccountId> {
        self.invited_by
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    // Guarded transitions; each returns false unless currently Pending

    pub fn accept(&mut self) -> bool {
        self.transition(InvitationStatus::Accepted)
    }

    pub fn decline(&mut self) -> bool {
        self.transition(InvitationStatus::Declined)
    }

    pub fn expire(&mut self) -> bool {
        self.transition(InvitationStatus::Expired)
    }

    fn transition(&mut self, to: InvitationStatus) -> bool {
        if !self.is_pending() {
            return false;
        }

        self.status = to;
        self.updated_at = Utc::now();
        true
    }
}
