//! Dialogue state machine use cases.
//!
//! A session is either awaiting a choice at a non-terminal statement or
//! complete at a terminal id. `StartScenario` creates the session at the
//! scenario's entry statement; `ProcessChoice` validates and applies one
//! choice, advancing to the next statement or resolving an ending.

mod advance;
mod start;
mod types;

pub use advance::{AdvanceError, ProcessChoice};
pub use start::{StartError, StartScenario};
pub use types::{ChoiceOutcome, ChoiceResult, OfferedChoice, StartedSession};
