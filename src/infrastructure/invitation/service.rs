//! Invite-code lifecycle: bulk creation, validation, acceptance,
//! competing-invite cleanup and expiry sweep

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::domain::account::{validate_email, Account, AccountRepository};
use crate::domain::clock::Clock;
use crate::domain::expiry::expiry_cutoff;
use crate::domain::invitation::{
    InvitationRepository, InvitationStatus, NewInvitation, TeamInvitation,
};
use crate::domain::notifier::{NotificationContext, NotificationTemplate, Notifier};
use crate::domain::team::TeamRepository;
use crate::domain::DomainError;
use crate::infrastructure::token::generate_invite_code;

/// Service owning team invitations from creation to a terminal status
#[derive(Debug)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    teams: Arc<dyn TeamRepository>,
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        teams: Arc<dyn TeamRepository>,
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            invitations,
            teams,
            accounts,
            notifier,
            clock,
            config,
        }
    }

    /// Create one pending invitation per email and request the invite
    /// emails.
    ///
    /// Every check runs before any row is written: the email cap, email
    /// shape, owner-only permission, and the already-registered scan
    /// (offending addresses are collected into the error). The insert is one
    /// atomic batch.
    pub async fn create_invitations(
        &self,
        emails: &[String],
        invited_by: &Account,
    ) -> Result<Vec<TeamInvitation>, DomainError> {
        let mut seen = HashSet::new();
        let emails: Vec<String> = emails
            .iter()
            .filter(|email| seen.insert(email.as_str()))
            .cloned()
            .collect();

        let max = self.config.max_invite_emails_per_request;
        if emails.len() > max {
            return Err(DomainError::validation(format!(
                "Not more than {max} email addresses are allowed"
            )));
        }

        for email in &emails {
            validate_email(email).map_err(|_| {
                DomainError::validation(format!("'{email}' is not a valid email address"))
            })?;
        }

        let team = self
            .teams
            .owned_by(invited_by.id())
            .await?
            .ok_or_else(|| {
                DomainError::permission_denied("Only a team owner can send invitations")
            })?;

        let existing = self.accounts.existing_emails(&emails).await?;
        if !existing.is_empty() {
            return Err(DomainError::conflict(format!(
                "Already associated with accounts: {}",
                existing.join(", ")
            )));
        }

        let now = self.clock.now();
        let batch = emails
            .into_iter()
            .map(|email| NewInvitation {
                invited_by: Some(invited_by.id()),
                email,
                code: generate_invite_code(),
                created_at: now,
            })
            .collect();

        let created = self.invitations.create_bulk(batch).await?;

        for invitation in &created {
            let mut context = NotificationContext::new();
            context.insert("code".to_string(), invitation.code().to_string());
            context.insert("team".to_string(), team.name().to_string());
            context.insert("invited_by".to_string(), invited_by.handle().to_string());

            if let Err(e) = self
                .notifier
                .send(
                    NotificationTemplate::TeamInviteEmail,
                    context,
                    invitation.email(),
                )
                .await
            {
                warn!(email = %invitation.email(), error = %e, "Failed to request invite email");
            }
        }

        info!(
            count = created.len(),
            team = %team.name(),
            "Team invitations created"
        );
        Ok(created)
    }

    /// Resolve (email, code) to its pending invitation.
    ///
    /// Accepted, declined, expired and nonexistent codes are all the same
    /// error to the caller.
    pub async fn validate_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<TeamInvitation, DomainError> {
        self.invitations
            .get_pending(email, code)
            .await?
            .ok_or_else(|| DomainError::not_found("Invite code is not valid or has expired"))
    }

    /// Accept a pending invitation. Returns false when it is no longer
    /// pending, so a double-accept race resolves to exactly one winner.
    pub async fn accept(&self, invitation: &TeamInvitation) -> Result<bool, DomainError> {
        self.invitations
            .transition(
                invitation.id(),
                InvitationStatus::Pending,
                InvitationStatus::Accepted,
            )
            .await
    }

    /// Decline every pending invitation addressed to the given emails.
    /// Invoked after a successful registration to clear stale competing
    /// invites.
    pub async fn decline_competing(&self, emails: &[String]) -> Result<usize, DomainError> {
        let declined = self.invitations.decline_pending(emails).await?;

        if declined > 0 {
            debug!(declined, "Declined competing pending invitations");
        }

        Ok(declined)
    }

    /// Move every pending invitation past the validity window to Expired.
    /// Rows are never deleted; expired invitations stay as audit history.
    pub async fn sweep_expired(&self) -> Result<usize, DomainError> {
        let cutoff = expiry_cutoff(self.clock.now(), self.config.invitation_validity_days);
        let expired = self.invitations.expire_pending(cutoff).await?;

        info!(expired, "Expired pending invitations swept");
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, NewAccount};
    use crate::domain::clock::mock::FixedClock;
    use crate::domain::notifier::mock::RecordingNotifier;
    use crate::domain::team::NewTeam;
    use crate::domain::verification::VerificationRepository;
    use crate::infrastructure::storage::{
        InMemoryAuthStore, InMemoryInvitationStore, InMemoryTeamStore,
    };
    use crate::infrastructure::token::INVITE_CODE_LEN;
    use chrono::Utc;

    struct Harness {
        service: InvitationService,
        auth_store: Arc<InMemoryAuthStore>,
        team_store: Arc<InMemoryTeamStore>,
        invitation_store: Arc<InMemoryInvitationStore>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<FixedClock>,
    }

    fn harness() -> Harness {
        let auth_store = Arc::new(InMemoryAuthStore::new());
        let team_store = Arc::new(InMemoryTeamStore::new());
        let invitation_store = Arc::new(InMemoryInvitationStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(FixedClock::at(Utc::now()));

        let service = InvitationService::new(
            invitation_store.clone(),
            team_store.clone(),
            auth_store.clone(),
            notifier.clone(),
            clock.clone(),
            AuthConfig::default(),
        );

        Harness {
            service,
            auth_store,
            team_store,
            invitation_store,
            notifier,
            clock,
        }
    }

    async fn seed_account(h: &Harness, handle: &str) -> Account {
        let (account, _) = h
            .auth_store
            .create_with_account(
                NewAccount {
                    handle: handle.to_string(),
                    email: format!("{handle}@example.com"),
                    password_hash: "hashed".to_string(),
                    active: true,
                    created_at: h.clock.now(),
                },
                &format!("{:0>40}", handle.len().to_string()),
            )
            .await
            .unwrap();
        account
    }

    async fn seed_owner(h: &Harness) -> Account {
        let owner = seed_account(h, "owner").await;
        h.team_store
            .create(NewTeam {
                name: "Research".to_string(),
                description: "a team".to_string(),
                owner: owner.id(),
                created_at: h.clock.now(),
            })
            .await
            .unwrap();
        owner
    }

    fn emails(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_invitations() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let created = h
            .service
            .create_invitations(&emails(&["a@example.com", "b@example.com"]), &owner)
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        for invitation in &created {
            assert!(invitation.is_pending());
            assert_eq!(invitation.code().len(), INVITE_CODE_LEN);
            assert_eq!(invitation.invited_by(), Some(owner.id()));
        }

        // fresh code per invitation
        assert_ne!(created[0].code(), created[1].code());

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent
            .iter()
            .all(|n| n.template == NotificationTemplate::TeamInviteEmail));
        assert_eq!(sent[0].context.get("team"), Some(&"Research".to_string()));
    }

    #[tokio::test]
    async fn test_too_many_emails_rejected_before_any_insert() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let six = emails(&[
            "a@example.com",
            "b@example.com",
            "c@example.com",
            "d@example.com",
            "e@example.com",
            "f@example.com",
        ]);

        let result = h.service.create_invitations(&six, &owner).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        assert!(h
            .invitation_store
            .list_by_email("a@example.com")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(h.notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_emails_are_collapsed() {
        let h = harness();
        let owner = seed_owner(&h).await;

        // six entries, five distinct: passes the cap and creates five
        let created = h
            .service
            .create_invitations(
                &emails(&[
                    "a@example.com",
                    "a@example.com",
                    "b@example.com",
                    "c@example.com",
                    "d@example.com",
                    "e@example.com",
                ]),
                &owner,
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 5);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let result = h
            .service
            .create_invitations(&emails(&["not-an-email"]), &owner)
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_invite() {
        let h = harness();
        let owner = seed_owner(&h).await;

        // a plain member of the team
        let member = seed_account(&h, "member").await;
        let team = h.team_store.owned_by(owner.id()).await.unwrap().unwrap();
        h.team_store
            .add_member(team.id(), member.id())
            .await
            .unwrap();

        let result = h
            .service
            .create_invitations(&emails(&["a@example.com"]), &member)
            .await;

        assert!(matches!(result, Err(DomainError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn test_registered_emails_are_reported() {
        let h = harness();
        let owner = seed_owner(&h).await;
        seed_account(&h, "existing").await;

        let result = h
            .service
            .create_invitations(
                &emails(&["existing@example.com", "new@example.com"]),
                &owner,
            )
            .await;

        match result {
            Err(DomainError::Conflict { message }) => {
                assert!(message.contains("existing@example.com"));
                assert!(!message.contains("new@example.com"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // nothing persisted for the clean address either
        assert!(h
            .invitation_store
            .list_by_email("new@example.com")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_validate_code() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let created = h
            .service
            .create_invitations(&emails(&["a@example.com"]), &owner)
            .await
            .unwrap();
        let invitation = &created[0];

        let found = h
            .service
            .validate_code("a@example.com", invitation.code())
            .await
            .unwrap();
        assert_eq!(found.id(), invitation.id());

        // wrong email, wrong code, or a consumed invitation: all the same error
        assert!(h
            .service
            .validate_code("b@example.com", invitation.code())
            .await
            .is_err());
        assert!(h
            .service
            .validate_code("a@example.com", "wrong-code")
            .await
            .is_err());

        h.service.accept(invitation).await.unwrap();
        let result = h
            .service
            .validate_code("a@example.com", invitation.code())
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_accept_is_at_most_once() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let created = h
            .service
            .create_invitations(&emails(&["a@example.com"]), &owner)
            .await
            .unwrap();

        assert!(h.service.accept(&created[0]).await.unwrap());
        assert!(!h.service.accept(&created[0]).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_then_decline_competing() {
        let h = harness();
        let owner = seed_owner(&h).await;

        // three pending invitations for the same address
        let first = h
            .service
            .create_invitations(&emails(&["alice@example.com"]), &owner)
            .await
            .unwrap();
        let second = h
            .service
            .create_invitations(&emails(&["alice@example.com"]), &owner)
            .await
            .unwrap();
        let third = h
            .service
            .create_invitations(&emails(&["alice@example.com"]), &owner)
            .await
            .unwrap();

        assert!(h.service.accept(&second[0]).await.unwrap());

        let declined = h
            .service
            .decline_competing(&emails(&["alice@example.com"]))
            .await
            .unwrap();
        assert_eq!(declined, 2);

        let accepted = h
            .invitation_store
            .get(second[0].id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status(), InvitationStatus::Accepted);

        for invitation in [&first[0], &third[0]] {
            let stored = h
                .invitation_store
                .get(invitation.id())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.status(), InvitationStatus::Declined);
        }
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let h = harness();
        let owner = seed_owner(&h).await;

        let old = h
            .service
            .create_invitations(&emails(&["old@example.com"]), &owner)
            .await
            .unwrap();

        h.clock.advance_days(7);

        let fresh = h
            .service
            .create_invitations(&emails(&["fresh@example.com"]), &owner)
            .await
            .unwrap();

        let expired = h.service.sweep_expired().await.unwrap();
        assert_eq!(expired, 1);

        // expired rows remain queryable
        let stored = h.invitation_store.get(old[0].id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), InvitationStatus::Expired);

        let kept = h
            .invitation_store
            .get(fresh[0].id())
            .await
            .unwrap()
            .unwrap();
        assert!(kept.is_pending());
    }
}
