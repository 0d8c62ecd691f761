//! Result payload types for the dialogue use cases.
//!
//! Outcomes are tagged rather than a single struct of optionals: a step is
//! either `Continuing` (next statement plus its offered choices) or
//! `Completed` (ending text plus the derived summary). JSON serialization
//! happens at the caller's boundary.

use serde::Serialize;

use ethos_domain::{ScenarioId, SessionId, SessionSummary, Statement};

/// One choice offered to the user, addressed by positional index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferedChoice {
    pub index: usize,
    pub text: String,
    pub category: String,
}

pub(crate) fn offered_choices(statement: &Statement) -> Vec<OfferedChoice> {
    statement
        .choices
        .iter()
        .enumerate()
        .map(|(index, choice)| OfferedChoice {
            index,
            text: choice.text.clone(),
            category: choice.category_label().to_string(),
        })
        .collect()
}

/// Payload returned by `StartScenario`.
#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub scenario_id: ScenarioId,
    pub title: String,
    pub description: String,
    pub issue: String,
    pub manager_type: String,
    pub statement_id: String,
    pub statement_text: String,
    pub choices: Vec<OfferedChoice>,
    pub step: u32,
    pub complete: bool,
}

/// Payload returned by `ProcessChoice`.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceResult {
    pub session_id: SessionId,
    pub scenario_id: ScenarioId,
    pub step: u32,
    /// Value score of the most recently accepted choice (0 when none).
    pub last_choice_score: i32,
    /// Tactic label of the most recently accepted choice.
    pub last_choice_category: String,
    #[serde(flatten)]
    pub outcome: ChoiceOutcome,
}

impl ChoiceResult {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, ChoiceOutcome::Completed { .. })
    }
}

/// Where the state machine landed after a choice (or a re-entry at a
/// terminal state).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChoiceOutcome {
    Continuing {
        statement_id: String,
        statement_text: String,
        choices: Vec<OfferedChoice>,
    },
    Completed {
        ending_text: String,
        summary: SessionSummary,
    },
}
