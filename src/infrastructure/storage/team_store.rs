//! In-memory team and membership store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::AccountId;
use crate::domain::team::{NewTeam, Team, TeamId, TeamRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct TeamStoreInner {
    next_id: i64,
    teams: HashMap<i64, Team>,
    /// account id -> team id; keying by account makes one-team-per-account
    /// a structural constraint
    membership: HashMap<i64, i64>,
}

/// In-memory implementation of [`TeamRepository`]
#[derive(Debug, Default)]
pub struct InMemoryTeamStore {
    inner: Arc<RwLock<TeamStoreInner>>,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamStore {
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let owner = team.owner;
        if inner.membership.contains_key(&owner.value()) {
            return Err(DomainError::conflict(format!(
                "Account '{owner}' already belongs to a team"
            )));
        }

        inner.next_id += 1;
        let id = TeamId::new(inner.next_id);

        let entity = Team::from_new(id, team);
        inner.teams.insert(id.value(), entity.clone());
        inner.membership.insert(owner.value(), id.value());

        Ok(entity)
    }

    async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.teams.get(&id.value()).cloned())
    }

    async fn add_member(&self, team: TeamId, account: AccountId) -> Result<(), DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if !inner.teams.contains_key(&team.value()) {
            return Err(DomainError::not_found(format!("Team '{team}' not found")));
        }

        match inner.membership.get(&account.value()) {
            Some(current) if *current == team.value() => Ok(()),
            Some(_) => Err(DomainError::conflict(format!(
                "Account '{account}' already belongs to a team"
            ))),
            None => {
                inner.membership.insert(account.value(), team.value());
                Ok(())
            }
        }
    }

    async fn members(&self, team: TeamId) -> Result<Vec<AccountId>, DomainError> {
        let inner = self.inner.read().await;

        let members = inner
            .membership
            .iter()
            .filter(|(_, t)| **t == team.value())
            .map(|(account, _)| AccountId::new(*account))
            .collect();

        Ok(members)
    }

    async fn team_of(&self, account: AccountId) -> Result<Option<Team>, DomainError> {
        let inner = self.inner.read().await;

        let Some(team_id) = inner.membership.get(&account.value()) else {
            return Ok(None);
        };

        Ok(inner.teams.get(team_id).cloned())
    }

    async fn owned_by(&self, account: AccountId) -> Result<Option<Team>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .teams
            .values()
            .find(|team| team.is_owned_by(account))
            .cloned())
    }

    async fn clear_owner(&self, account: AccountId) -> Result<usize, DomainError> {
        let mut inner = self.inner.write().await;

        let mut cleared = 0;
        for team in inner.teams.values_mut() {
            if team.is_owned_by(account) {
                team.clear_owner();
                cleared += 1;
            }
        }

        Ok(cleared)
    }
}
