//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod alert;
pub mod session;
pub mod user;

pub use alert::{AlertFilter, AlertRepository, AlertStats, DailyAlertCount, NewAlert};
pub use session::{CreateSessionInput, CreatedSession, RevokeOutcome, SecurityStats, SessionRepository};
pub use user::UserRepository;
