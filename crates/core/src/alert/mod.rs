//! Security alert taxonomy and policy.
//!
//! Defines the closed alert-type, severity, and status enums, the
//! severity-driven notification fan-out policy, and the typed metadata
//! attached to alerts. Persistence and querying live in the db crate;
//! delivery is an external collaborator behind [`NotificationDispatcher`].

mod channels;
mod dispatch;
mod metadata;
mod types;

pub use channels::channels_for;
pub use dispatch::NotificationDispatcher;
pub use metadata::AlertMetadata;
pub use types::{AlertSeverity, AlertStatus, AlertType, NotificationChannel};
