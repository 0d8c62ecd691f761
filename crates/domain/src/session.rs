//! Per-session progress state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::{ScenarioId, SessionId, UserId};
use crate::scenario::is_terminal;

/// One user's in-progress or completed traversal of a scenario.
///
/// The three histories are parallel: index `i` holds the text, value score,
/// and tactic label of the `i`-th accepted choice. [`record_choice`] is the
/// only mutation path, so the equal-length invariant holds by construction,
/// as does `step == histories.len() + 1`.
///
/// [`record_choice`]: SessionState::record_choice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub scenario_id: ScenarioId,
    pub current_statement_id: String,
    pub step: u32,
    pub choice_history: Vec<String>,
    pub score_history: Vec<i32>,
    pub tactic_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(
        session_id: SessionId,
        user_id: UserId,
        scenario_id: ScenarioId,
        entry_statement_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            user_id,
            scenario_id,
            current_statement_id: entry_statement_id.into(),
            step: 1,
            choice_history: Vec::new(),
            score_history: Vec::new(),
            tactic_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one accepted choice to all three histories, advance the step,
    /// and move the cursor to `destination`.
    pub fn record_choice(
        &mut self,
        choice_text: impl Into<String>,
        value: i32,
        tactic: impl Into<String>,
        destination: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.choice_history.push(choice_text.into());
        self.score_history.push(value);
        self.tactic_history.push(tactic.into());
        self.step += 1;
        self.current_statement_id = destination.into();
        self.updated_at = now;
    }

    /// True once the cursor sits on a terminal statement id.
    pub fn is_complete(&self) -> bool {
        is_terminal(&self.current_statement_id)
    }

    /// Sum of the value-score history (the raw, unnormalized total).
    pub fn raw_score(&self) -> i32 {
        self.score_history.iter().sum()
    }

    pub fn choices_made(&self) -> usize {
        self.score_history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_session() -> SessionState {
        SessionState::new(
            SessionId::new("sess-1"),
            UserId::new("user-1"),
            ScenarioId::new("sc001"),
            "stmt_1",
            Utc::now(),
        )
    }

    #[test]
    fn starts_at_step_one_with_empty_histories() {
        let session = new_session();
        assert_eq!(session.step, 1);
        assert_eq!(session.choices_made(), 0);
        assert_eq!(session.raw_score(), 0);
        assert!(!session.is_complete());
    }

    #[test]
    fn record_choice_grows_all_histories_in_lockstep() {
        let mut session = new_session();
        session.record_choice("Push back", 1, "Evidence", "stmt_2", Utc::now());
        session.record_choice("Cave", -1, "Compliance", "end_bad", Utc::now());

        assert_eq!(session.choice_history.len(), 2);
        assert_eq!(session.score_history.len(), 2);
        assert_eq!(session.tactic_history.len(), 2);
        assert_eq!(session.step, 3);
        assert_eq!(session.current_statement_id, "end_bad");
        assert_eq!(session.raw_score(), 0);
        assert!(session.is_complete());
    }
}
