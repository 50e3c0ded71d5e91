//! Notification delivery collaborator.

use async_trait::async_trait;
use uuid::Uuid;

use super::types::NotificationChannel;

/// External notification collaborator.
///
/// The alert sink decides which channels to schedule and records that
/// intent; implementations take the hand-off from there. `schedule` must
/// return promptly — delivery confirmation never blocks the raising
/// request.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Hands one scheduled channel off for out-of-band delivery.
    async fn schedule(&self, channel: NotificationChannel, alert_id: Uuid, user_id: Uuid);
}
