//! Port traits for external collaborators.
//!
//! The engine reads two things from the outside world: scenario documents
//! (by id) and a user's stored manager-type preference. Both are read-only
//! and pluggable; adapters live alongside in this module tree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ethos_domain::{ScenarioId, UserId};

/// Errors from source adapters, with operation context for tracing.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Underlying read failed (filesystem, network, whatever the adapter
    /// talks to).
    #[error("Source error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    /// The document was readable but not decodable as JSON.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn io(operation: &'static str, message: impl ToString) -> Self {
        Self::Io {
            operation,
            message: message.to_string(),
        }
    }

    pub fn decode(message: impl ToString) -> Self {
        Self::Decode(message.to_string())
    }
}

/// Read-only access to scenario documents.
///
/// `fetch` returns `Ok(None)` for an unknown id; errors are reserved for
/// infrastructure failures so the catalog can distinguish "absent" (a miss,
/// never cached) from "broken" (surfaced to the caller).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenarioSource: Send + Sync {
    async fn fetch(&self, id: &ScenarioId) -> Result<Option<serde_json::Value>, SourceError>;
    async fn list(&self) -> Result<Vec<ScenarioId>, SourceError>;
}

/// Read-only access to a user's stored manager-type preference. Used only
/// to bias scenario suggestion; absence is normal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceSource: Send + Sync {
    async fn manager_type(&self, user_id: &UserId) -> Result<Option<String>, SourceError>;
}

/// Clock abstraction so session timestamps are testable.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside tests.
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
