//! Notification collaborator contract
//!
//! The core's responsibility ends at "notification requested". Template
//! rendering and delivery live behind this trait so tests run synchronously
//! and production can dispatch out-of-band.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use thiserror::Error;

/// Message kinds the core can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationTemplate {
    ActivationEmail,
    PasswordResetEmail,
    TeamInviteEmail,
}

impl std::fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivationEmail => write!(f, "activation_email"),
            Self::PasswordResetEmail => write!(f, "password_reset_email"),
            Self::TeamInviteEmail => write!(f, "team_invite_email"),
        }
    }
}

/// Template variables handed to the renderer
pub type NotificationContext = HashMap<String, String>;

#[derive(Debug, Error)]
#[error("notification dispatch failed: {message}")]
pub struct NotifierError {
    message: String,
}

impl NotifierError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fire-and-forget notification dispatch.
///
/// A failing send must never fail the state transition that triggered it;
/// callers log the error and move on.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn send(
        &self,
        template: NotificationTemplate,
        context: NotificationContext,
        recipient: &str,
    ) -> Result<(), NotifierError>;
}
