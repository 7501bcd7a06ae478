use admq::{Job, JobType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    RegistrationConfirmation,
    TeamConfirmation,
    PasswordReset,
}

/// Delivery parameters for one outbound notification. Content rendering
/// and transport semantics live with the sender, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Job for Notification {
    const JOB_TYPE: JobType = Cow::Borrowed("send-notification");
}

/// Transport supplied by the surrounding system.
#[async_trait]
pub trait NotifySender: Send + Sync + 'static {
    async fn send(&self, notification: &Notification) -> Result<(), String>;
}

/// Reference transport that only logs the delivery.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSender;

#[async_trait]
impl NotifySender for TracingSender {
    async fn send(&self, notification: &Notification) -> Result<(), String> {
        tracing::info!(
            "delivering {:?} notification to {}: {}",
            notification.kind,
            notification.to,
            notification.subject
        );
        Ok(())
    }
}
