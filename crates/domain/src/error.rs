//! Unified error types for the domain layer.
//!
//! Provides a common error type used across scenario parsing and session
//! traversal, so the engine crate can map failures onto its user-facing
//! taxonomy without stringly-typed plumbing.

use thiserror::Error;

/// Unified error type for domain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The scenario document is structurally unusable (missing entry
    /// statement, empty statement map, malformed choice or range entries).
    #[error("Malformed scenario document: {0}")]
    Malformed(String),

    /// A transition or lookup referenced a statement id absent from the
    /// scenario's statement map.
    #[error("Statement not found in scenario: {0}")]
    MissingStatement(String),

    /// A resolved ending id is absent from the scenario's endings map.
    #[error("Ending not found in scenario: {0}")]
    MissingEnding(String),

    /// A choice index fell outside the offered range for a statement.
    #[error("Choice index {index} out of range for statement {statement_id} ({available} offered)")]
    ChoiceOutOfRange {
        statement_id: String,
        index: usize,
        available: usize,
    },
}

impl DomainError {
    /// Create a malformed-document error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a missing-statement error.
    pub fn missing_statement(id: impl Into<String>) -> Self {
        Self::MissingStatement(id.into())
    }

    /// Create a missing-ending error.
    pub fn missing_ending(id: impl Into<String>) -> Self {
        Self::MissingEnding(id.into())
    }

    /// Create an out-of-range choice error.
    pub fn choice_out_of_range(
        statement_id: impl Into<String>,
        index: usize,
        available: usize,
    ) -> Self {
        Self::ChoiceOutOfRange {
            statement_id: statement_id.into(),
            index,
            available,
        }
    }
}
