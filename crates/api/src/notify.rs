//! Notification hand-off.
//!
//! Delivery itself (email, push, SMS) is owned by an external service;
//! this process only records the hand-off. The logging dispatcher is the
//! default wiring until the delivery queue integration lands.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use civitrack_core::alert::{NotificationChannel, NotificationDispatcher};

/// Dispatcher that logs each scheduled channel and nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn schedule(&self, channel: NotificationChannel, alert_id: Uuid, user_id: Uuid) {
        info!(
            channel = channel.as_str(),
            %alert_id,
            %user_id,
            "notification scheduled"
        );
    }
}
