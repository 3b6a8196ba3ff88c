//! Outbound user alerts.
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::domain::models::goal::Goal;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other on the device
    pub tag: String,
    pub url: String,
}

impl Notification {
    pub fn goal_reached(goal: &Goal) -> Self {
        Self {
            title: "Goal reached".to_string(),
            body: format!(
                "{}: {:.2} of {:.2} ({})",
                goal.name, goal.current, goal.target, goal.period
            ),
            tag: format!("goal-reached-{}", goal.id),
            url: "/goals".to_string(),
        }
    }
}

/// Destination for user alerts (push service, in-app banner, ...)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, owner_id: &str, notification: Notification) -> Result<()>;
}

/// Sink that only writes alerts to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, owner_id: &str, notification: Notification) -> Result<()> {
        info!(
            owner = owner_id,
            tag = %notification.tag,
            url = %notification.url,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}
