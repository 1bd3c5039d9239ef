//! In-memory team invitation store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::invitation::{
    InvitationId, InvitationRepository, InvitationStatus, NewInvitation, TeamInvitation,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct InvitationStoreInner {
    next_id: i64,
    invitations: HashMap<i64, TeamInvitation>,
    /// (email, code) -> invitation id; pairs stay reserved even after the
    /// invitation reaches a terminal status
    code_index: HashMap<(String, String), i64>,
}

/// In-memory implementation of [`InvitationRepository`]
#[derive(Debug, Default)]
pub struct InMemoryInvitationStore {
    inner: Arc<RwLock<InvitationStoreInner>>,
}

impl InMemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvitationRepository for InMemoryInvitationStore {
    async fn create_bulk(
        &self,
        invitations: Vec<NewInvitation>,
    ) -> Result<Vec<TeamInvitation>, DomainError> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        // validate the whole batch before touching any row
        let mut batch_pairs = HashSet::new();
        for invitation in &invitations {
            let pair = (invitation.email.clone(), invitation.code.clone());
            if inner.code_index.contains_key(&pair) || !batch_pairs.insert(pair) {
                return Err(DomainError::conflict(format!(
                    "Invite code already issued for '{}'",
                    invitation.email
                )));
            }
        }

        let mut created = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            inner.next_id += 1;
            let id = InvitationId::new(inner.next_id);

            let pair = (invitation.email.clone(), invitation.code.clone());
            let entity = TeamInvitation::from_new(id, invitation);

            inner.code_index.insert(pair, id.value());
            inner.invitations.insert(id.value(), entity.clone());
            created.push(entity);
        }

        Ok(created)
    }

    async fn get(&self, id: InvitationId) -> Result<Option<TeamInvitation>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.invitations.get(&id.value()).cloned())
    }

    async fn get_pending(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<TeamInvitation>, DomainError> {
        let inner = self.inner.read().await;

        let Some(id) = inner
            .code_index
            .get(&(email.to_string(), code.to_string()))
        else {
            return Ok(None);
        };

        Ok(inner
            .invitations
            .get(id)
            .filter(|invitation| invitation.is_pending())
            .cloned())
    }

    async fn transition(
        &self,
        id: InvitationId,
        from: InvitationStatus,
        to: InvitationStatus,
    ) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        let Some(invitation) = inner.invitations.get_mut(&id.value()) else {
            return Ok(false);
        };

        if invitation.status() != from {
            return Ok(false);
        }

        let changed = match to {
            InvitationStatus::Accepted => invitation.accept(),
            InvitationStatus::Declined => invitation.decline(),
            InvitationStatus::Expired => invitation.expire(),
            InvitationStatus::Pending => false,
        };

        Ok(changed)
    }

    async fn decline_pending(&self, emails: &[String]) -> Result<usize, DomainError> {
        let targets: HashSet<&str> = emails.iter().map(String::as_str).collect();
        let mut inner = self.inner.write().await;

        let mut declined = 0;
        for invitation in inner.invitations.values_mut() {
            if invitation.is_pending() && targets.contains(invitation.email()) && invitation.decline()
            {
                declined += 1;
            }
        }

        Ok(declined)
    }

    async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut inner = self.inner.write().await;

        let mut expired = 0;
        for invitation in inner.invitations.values_mut() {
            if invitation.is_pending() && invitation.created_at() <= cutoff && invitation.expire() {
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<TeamInvitation>, DomainError> {
        let inner = self.inner.read().await;

        let matching = inner
            .invitations
            .values()
            .filter(|invitation| invitation.email() == email)
            .cloned()
            .collect();

        Ok(matching)
    }
}
