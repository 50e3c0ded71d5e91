//! Core session-security logic for CiviTrack.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, heuristics, and calculations live here.
//!
//! # Modules
//!
//! - `fingerprint` - Device classification and location resolution
//! - `risk` - Login risk scoring against session history
//! - `alert` - Security alert taxonomy and channel fan-out policy
//! - `auth` - Password hashing

pub mod alert;
pub mod auth;
pub mod fingerprint;
pub mod risk;
