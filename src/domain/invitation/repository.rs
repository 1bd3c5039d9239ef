//! Invitation repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{InvitationId, InvitationStatus, NewInvitation, TeamInvitation};
use crate::domain::DomainError;

/// Repository for team invitations.
///
/// Expired invitations are never deleted; the sweep only moves them to a
/// terminal status so they remain queryable as history.
#[async_trait]
pub trait InvitationRepository: Send + Sync + Debug {
    /// Insert a batch of invitations as one atomic unit.
    ///
    /// Fails with a conflict (and inserts nothing) when any `(email, code)`
    /// pair collides, within the batch or with stored rows.
    async fn create_bulk(
        &self,
        invitations: Vec<NewInvitation>,
    ) -> Result<Vec<TeamInvitation>, DomainError>;

    /// Get an invitation by id
    async fn get(&self, id: InvitationId) -> Result<Option<TeamInvitation>, DomainError>;

    /// Exact match on (email, code) with Pending status; any other status
    /// or an absent row yields `None`
    async fn get_pending(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<TeamInvitation>, DomainError>;

    /// Atomically transition an invitation from `from` to `to`. Returns
    /// false without mutating when the stored status differs from `from`.
    async fn transition(
        &self,
        id: InvitationId,
        from: InvitationStatus,
        to: InvitationStatus,
    ) -> Result<bool, DomainError>;

    /// Bulk-decline every pending invitation addressed to any of the given
    /// emails; returns the number declined
    async fn decline_pending(&self, emails: &[String]) -> Result<usize, DomainError>;

    /// Bulk-expire every pending invitation created at or before `cutoff`;
    /// returns the number expired
    async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    /// All invitations addressed to an email, any status
    async fn list_by_email(&self, email: &str) -> Result<Vec<TeamInvitation>, DomainError>;
}
