//! Ethos Engine library.
//!
//! Server-side engine for scenario sessions: loads immutable scenario
//! documents through a pluggable source, tracks per-session progress in a
//! concurrent registry, and drives the dialogue state machine that scores
//! choices and resolves endings.
//!
//! ## Structure
//!
//! - `infrastructure/` - External dependency ports and adapters
//! - `catalog` - Memoized scenario catalog
//! - `stores/` - In-memory session registry
//! - `use_cases/` - Dialogue and suggestion flows
//! - `app` - Engine composition

pub mod app;
pub mod catalog;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures shared across unit tests.
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use app::Engine;
