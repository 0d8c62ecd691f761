//! Ethos Domain - core types for the scenario session engine.
//!
//! This crate holds the pure domain model: scenario documents and their
//! parsing rules, per-session progress state, and the scoring/feedback
//! value objects. It performs no I/O; loading and storage live in the
//! engine crate.

pub mod error;
pub mod ids;
pub mod scenario;
pub mod scoring;
pub mod session;

pub use error::DomainError;
pub use ids::{ScenarioId, SessionId, UserId};
pub use scenario::{
    is_terminal, Choice, Ending, ScenarioDefinition, ScoreRange, Statement, FINAL_SCORE_ID,
    TERMINAL_PREFIX, UNKNOWN_CATEGORY,
};
pub use scoring::{normalized_score, tactic_histogram, DecisionKind, PerformanceTier, SessionSummary};
pub use session::SessionState;
