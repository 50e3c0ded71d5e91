//! `SeaORM` entity definitions.

pub mod security_alerts;
pub mod sessions;
pub mod users;
