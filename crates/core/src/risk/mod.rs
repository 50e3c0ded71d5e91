//! Login risk scoring.
//!
//! Scoring is a pure function of the new session's fingerprint, the user's
//! prior session history, and the event timestamp. It performs no I/O and
//! is deterministic given its inputs, so it can be unit-tested and replayed
//! offline.

mod engine;
mod geo;
#[cfg(test)]
mod props;
mod types;

pub use engine::score;
pub use geo::haversine_km;
pub use types::{RiskAssessment, RiskLevel, SessionObservation};
