//! Default notifier implementation
//!
//! Email rendering and delivery are external concerns; the shipped
//! implementation only records that a notification was requested.

use async_trait::async_trait;
use tracing::info;

use crate::domain::notifier::{
    NotificationContext, NotificationTemplate, Notifier, NotifierError,
};

/// Notifier that logs each request and reports success.
///
/// Production deployments substitute a delivery-backed implementation; the
/// core never waits on delivery either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        template: NotificationTemplate,
        context: NotificationContext,
        recipient: &str,
    ) -> Result<(), NotifierError> {
        // context values carry one-time tokens; log keys only
        let mut keys: Vec<&str> = context.keys().map(String::as_str).collect();
        keys.sort_unstable();

        info!(template = %template, recipient, context_keys = ?keys, "Notification requested");
        Ok(())
    }
}
