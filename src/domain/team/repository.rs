//! Team repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewTeam, Team, TeamId};
use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Repository for teams and the account-to-team membership relation.
///
/// One team per account is a storage-level constraint here: `create` and
/// `add_member` both refuse an account that already belongs to a team, under
/// the same lock that mutates the membership relation.
#[async_trait]
pub trait TeamRepository: Send + Sync + Debug {
    /// Create a team and enroll the owner as its first member atomically.
    ///
    /// Fails with a conflict when the owner already belongs to a team.
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError>;

    /// Get a team by id
    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError>;

    /// Add an account to a team. Idempotent for an existing member of the
    /// same team; a conflict when the account belongs to another team.
    async fn add_member(&self, team: TeamId, account: AccountId) -> Result<(), DomainError>;

    /// Member account ids of a team
    async fn members(&self, team: TeamId) -> Result<Vec<AccountId>, DomainError>;

    /// Whether an account is a member of the given team
    async fn is_member(&self, team: TeamId, account: AccountId) -> Result<bool, DomainError> {
        Ok(self.members(team).await?.contains(&account))
    }

    /// The team an account belongs to, if any
    async fn team_of(&self, account: AccountId) -> Result<Option<Team>, DomainError>;

    /// The team an account owns, if any
    async fn owned_by(&self, account: AccountId) -> Result<Option<Team>, DomainError>;

    /// Null the owner reference on every team owned by the account; returns
    /// the number of teams touched
    async fn clear_owner(&self, account: AccountId) -> Result<usize, DomainError>;
}
