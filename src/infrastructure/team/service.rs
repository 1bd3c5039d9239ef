//! Team creation and membership queries

use std::sync::Arc;

use tracing::info;

use crate::domain::account::{Account, AccountId};
use crate::domain::clock::Clock;
use crate::domain::team::{validate_team_name, NewTeam, Team, TeamId, TeamRepository};
use crate::domain::DomainError;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: String,
}

/// Team service
#[derive(Debug)]
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    clock: Arc<dyn Clock>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { teams, clock }
    }

    /// Create a team owned by `owner`, who becomes its first member.
    ///
    /// An account may belong to at most one team. The check here gives the
    /// friendly error; the store re-checks under its write lock, so two
    /// concurrent creates cannot both succeed.
    pub async fn create(
        &self,
        owner: &Account,
        request: CreateTeamRequest,
    ) -> Result<Team, DomainError> {
        validate_team_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;

        if !owner.is_active() {
            return Err(DomainError::permission_denied("Account is not active"));
        }

        if self.teams.team_of(owner.id()).await?.is_some() {
            return Err(DomainError::permission_denied(
                "Account already belongs to a team",
            ));
        }

        let team = self
            .teams
            .create(NewTeam {
                name: request.name,
                description: request.description,
                owner: owner.id(),
                created_at: self.clock.now(),
            })
            .await?;

        info!(team_id = %team.id(), name = %team.name(), owner = %owner.handle(), "Team created");
        Ok(team)
    }

    /// Get a team by id
    pub async fn get(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        self.teams.get(id).await
    }

    /// The team an account belongs to, if any
    pub async fn team_of(&self, account: AccountId) -> Result<Option<Team>, DomainError> {
        self.teams.team_of(account).await
    }

    /// Member account ids of a team
    pub async fn members(&self, team: TeamId) -> Result<Vec<AccountId>, DomainError> {
        self.teams.members(team).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::NewAccount;
    use crate::domain::clock::mock::FixedClock;
    use crate::infrastructure::storage::InMemoryTeamStore;
    use chrono::Utc;

    fn make_account(id: i64, active: bool) -> Account {
        Account::from_new(
            AccountId::new(id),
            NewAccount {
                handle: format!("user-{id}"),
                email: format!("user-{id}@example.com"),
                password_hash: "hashed".to_string(),
                active,
                created_at: Utc::now(),
            },
        )
    }

    fn service() -> (TeamService, Arc<InMemoryTeamStore>) {
        let store = Arc::new(InMemoryTeamStore::new());
        let clock = Arc::new(FixedClock::at(Utc::now()));
        (TeamService::new(store.clone(), clock), store)
    }

    fn request(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            description: "a team".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_team() {
        let (service, store) = service();
        let owner = make_account(1, true);

        let team = service.create(&owner, request("Research")).await.unwrap();

        assert_eq!(team.name(), "Research");
        assert_eq!(team.owner(), Some(owner.id()));
        assert!(store.is_member(team.id(), owner.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_team_invalid_name() {
        let (service, _) = service();
        let owner = make_account(1, true);

        let result = service.create(&owner, request("")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_inactive_owner_cannot_create() {
        let (service, _) = service();
        let owner = make_account(1, false);

        let result = service.create(&owner, request("Research")).await;
        assert!(matches!(result, Err(DomainError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn test_one_team_per_account() {
        let (service, _) = service();
        let owner = make_account(1, true);

        service.create(&owner, request("First")).await.unwrap();

        let result = service.create(&owner, request("Second")).await;
        assert!(matches!(result, Err(DomainError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn test_member_cannot_create_team() {
        let (service, store) = service();
        let owner = make_account(1, true);
        let member = make_account(2, true);

        let team = service.create(&owner, request("Research")).await.unwrap();
        store.add_member(team.id(), member.id()).await.unwrap();

        let result = service.create(&member, request("Splinter")).await;
        assert!(matches!(result, Err(DomainError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn test_team_of_and_members() {
        let (service, store) = service();
        let owner = make_account(1, true);

        let team = service.create(&owner, request("Research")).await.unwrap();
        store.add_member(team.id(), AccountId::new(2)).await.unwrap();

        let found = service.team_of(AccountId::new(2)).await.unwrap().unwrap();
        assert_eq!(found.id(), team.id());

        assert_eq!(service.members(team.id()).await.unwrap().len(), 2);
    }
}
