use std::sync::Arc;

use chrono::{DateTime, Utc};

use ethos_domain::{
    is_terminal, DomainError, ScenarioDefinition, ScenarioId, SessionId, SessionState,
    SessionSummary, UserId, FINAL_SCORE_ID,
};

use crate::catalog::{CatalogError, ScenarioCatalog};
use crate::infrastructure::ports::ClockPort;
use crate::stores::SessionStore;

use super::types::{offered_choices, ChoiceOutcome, ChoiceResult};

#[derive(Debug, thiserror::Error)]
pub enum AdvanceError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),
    #[error("Invalid choice index {index} ({available} offered)")]
    InvalidChoice { index: usize, available: usize },
    #[error("Scenario data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Scenario source error: {0}")]
    Source(String),
}

/// Validates and applies one user choice, advancing the session to the
/// next statement or resolving an ending.
pub struct ProcessChoice {
    catalog: Arc<ScenarioCatalog>,
    sessions: Arc<SessionStore>,
    clock: Arc<dyn ClockPort>,
}

impl ProcessChoice {
    pub fn new(
        catalog: Arc<ScenarioCatalog>,
        sessions: Arc<SessionStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            catalog,
            sessions,
            clock,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        scenario_id: ScenarioId,
        session_id: SessionId,
        choice_index: usize,
        current_statement_id: Option<&str>,
    ) -> Result<ChoiceResult, AdvanceError> {
        // Session existence is checked before the scenario so the caller
        // gets the more specific failure.
        if self.sessions.get(&session_id).await.is_none() {
            return Err(AdvanceError::SessionNotFound(session_id));
        }

        let scenario = match self.catalog.load(&scenario_id).await {
            Ok(Some(scenario)) => scenario,
            Ok(None) => return Err(AdvanceError::ScenarioNotFound(scenario_id)),
            Err(CatalogError::Malformed { id, reason }) => {
                tracing::warn!(scenario_id = %id, error = %reason, "malformed scenario treated as not found");
                return Err(AdvanceError::ScenarioNotFound(id));
            }
            Err(CatalogError::Source(e)) => return Err(AdvanceError::Source(e.to_string())),
        };

        let now = self.clock.now();
        let result = self
            .sessions
            .mutate(&session_id, |session| {
                advance_session(
                    scenario.as_ref(),
                    session,
                    choice_index,
                    current_statement_id,
                    now,
                )
            })
            .await
            .ok_or_else(|| AdvanceError::SessionNotFound(session_id.clone()))??;

        if result.is_complete() {
            tracing::info!(
                %session_id,
                %scenario_id,
                user_id = %user_id,
                step = result.step,
                "scenario session complete"
            );
        } else {
            tracing::debug!(%session_id, step = result.step, "session advanced");
        }
        Ok(result)
    }
}

/// Core transition, executed under the per-session lock.
fn advance_session(
    scenario: &ScenarioDefinition,
    session: &mut SessionState,
    choice_index: usize,
    current_statement_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ChoiceResult, AdvanceError> {
    // Idempotency guard: a completed session is never reprocessed; the
    // completion payload is recomputed so repeated "next" calls are safe.
    if session.is_complete() {
        let (ending_text, summary) = resolve_completion(scenario, session)?;
        return Ok(result_for(
            session,
            ChoiceOutcome::Completed {
                ending_text,
                summary,
            },
        ));
    }

    // Prefer the caller's statement id, but fall back to the stored cursor
    // when it is absent or blank (stale client defense).
    let statement_id = match current_statement_id {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => session.current_statement_id.clone(),
    };
    let statement = scenario
        .statement(&statement_id)
        .map_err(|e| AdvanceError::DataIntegrity(e.to_string()))?;
    let choice = statement
        .choice(&statement_id, choice_index)
        .map_err(|e| match e {
            DomainError::ChoiceOutOfRange {
                index, available, ..
            } => AdvanceError::InvalidChoice { index, available },
            other => AdvanceError::DataIntegrity(other.to_string()),
        })?
        .clone();

    let destination = choice.leads_to.clone();
    let category_label = choice.category_label().to_string();
    session.record_choice(
        choice.text,
        choice.value,
        category_label,
        destination.clone(),
        now,
    );

    if is_terminal(&destination) {
        let (ending_text, summary) = resolve_completion(scenario, session)?;
        Ok(result_for(
            session,
            ChoiceOutcome::Completed {
                ending_text,
                summary,
            },
        ))
    } else {
        let next = scenario
            .statement(&destination)
            .map_err(|e| AdvanceError::DataIntegrity(e.to_string()))?;
        Ok(result_for(
            session,
            ChoiceOutcome::Continuing {
                statement_id: destination,
                statement_text: next.text.clone(),
                choices: offered_choices(next),
            },
        ))
    }
}

/// Resolve the ending text and summary for a session sitting at a terminal
/// statement. Pure with respect to the session; safe for idempotent
/// re-entry.
fn resolve_completion(
    scenario: &ScenarioDefinition,
    session: &SessionState,
) -> Result<(String, SessionSummary), AdvanceError> {
    let summary = SessionSummary::from_session(session);

    let ending_text = if session.current_statement_id == FINAL_SCORE_ID {
        let total = session.raw_score();
        match scenario.ending_for_score(total) {
            Some(ending_id) => scenario
                .ending(ending_id)
                .map_err(|e| AdvanceError::DataIntegrity(e.to_string()))?
                .text
                .clone(),
            // No containing range: the derived debrief stands in for the
            // ending text.
            None => summary.formatted_report(),
        }
    } else {
        scenario
            .ending(&session.current_statement_id)
            .map_err(|e| AdvanceError::DataIntegrity(e.to_string()))?
            .text
            .clone()
    };

    let summary = summary.with_ending_message(ending_text.clone());
    Ok((ending_text, summary))
}

fn result_for(session: &SessionState, outcome: ChoiceOutcome) -> ChoiceResult {
    ChoiceResult {
        session_id: session.session_id.clone(),
        scenario_id: session.scenario_id.clone(),
        step: session.step,
        last_choice_score: session.score_history.last().copied().unwrap_or(0),
        last_choice_category: session
            .tactic_history
            .last()
            .cloned()
            .unwrap_or_else(|| ethos_domain::UNKNOWN_CATEGORY.to_string()),
        outcome,
    }
}
