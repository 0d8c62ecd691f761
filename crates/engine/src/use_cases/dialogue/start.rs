use std::sync::Arc;

use ethos_domain::{ScenarioId, SessionId, SessionState, UserId};

use crate::catalog::{CatalogError, ScenarioCatalog};
use crate::infrastructure::ports::ClockPort;
use crate::stores::SessionStore;

use super::types::{offered_choices, StartedSession};

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),
    #[error("Scenario data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Scenario source error: {0}")]
    Source(String),
}

/// Creates a session at a scenario's entry statement.
pub struct StartScenario {
    catalog: Arc<ScenarioCatalog>,
    sessions: Arc<SessionStore>,
    clock: Arc<dyn ClockPort>,
}

impl StartScenario {
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
    ) -> Result<StartedSession, StartError> {
        let scenario = match self.catalog.load(&scenario_id).await {
            Ok(Some(scenario)) => scenario,
            Ok(None) => return Err(StartError::ScenarioNotFound(scenario_id)),
            // An unparseable document is indistinguishable from a missing
            // one as far as the caller is concerned.
            Err(CatalogError::Malformed { id, reason }) => {
                tracing::warn!(scenario_id = %id, error = %reason, "malformed scenario treated as not found");
                return Err(StartError::ScenarioNotFound(id));
            }
            Err(CatalogError::Source(e)) => return Err(StartError::Source(e.to_string())),
        };

        let entry_id = scenario.starting_statement_id.clone();
        let entry = scenario
            .statement(&entry_id)
            .map_err(|e| StartError::DataIntegrity(e.to_string()))?;

        // Overwrites any prior session under this id; restarting resets
        // progress by contract.
        self.sessions.create(SessionState::new(
            session_id.clone(),
            user_id.clone(),
            scenario_id.clone(),
            entry_id.clone(),
            self.clock.now(),
        ));
        tracing::info!(
            %session_id,
            %scenario_id,
            user_id = %user_id,
            "scenario session started"
        );

        Ok(StartedSession {
            session_id,
            scenario_id,
            title: scenario.title.clone(),
            description: scenario.description.clone(),
            issue: scenario.issue.clone(),
            manager_type: scenario.manager_type.clone(),
            statement_id: entry_id,
            statement_text: entry.text.clone(),
            choices: offered_choices(entry),
            step: 1,
            complete: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockScenarioSource;
    use crate::test_fixtures::{engine_parts, sample_scenario_doc};

    #[tokio::test]
    async fn start_returns_entry_statement_and_choices() {
        let mut source = MockScenarioSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(Some(sample_scenario_doc())));
        let (catalog, sessions, clock) = engine_parts(source);
        let start = StartScenario::new(catalog, sessions.clone(), clock);

        let started = start
            .execute(
                UserId::new("user-1"),
                ScenarioId::new("sc001"),
                SessionId::new("sess-1"),
            )
            .await
            .expect("start");

        assert_eq!(started.title, "Shortcut under pressure");
        assert_eq!(started.statement_id, "stmt_1");
        assert_eq!(started.step, 1);
        assert!(!started.complete);
        assert_eq!(started.choices.len(), 3);
        assert_eq!(started.choices[0].index, 0);
        assert_eq!(started.choices[0].category, "Evidence");
        // category resolved through the tactic->category fallback chain
        assert_eq!(started.choices[2].category, "Compliance");

        let state = sessions
            .get(&SessionId::new("sess-1"))
            .await
            .expect("session stored");
        assert_eq!(state.current_statement_id, "stmt_1");
        assert_eq!(state.step, 1);
    }

    #[tokio::test]
    async fn start_unknown_scenario_fails_not_found() {
        let mut source = MockScenarioSource::new();
        source.expect_fetch().returning(|_| Ok(None));
        let (catalog, sessions, clock) = engine_parts(source);
        let start = StartScenario::new(catalog, sessions, clock);

        let err = start
            .execute(
                UserId::new("user-1"),
                ScenarioId::new("missing"),
                SessionId::new("sess-1"),
            )
            .await;
        assert!(matches!(err, Err(StartError::ScenarioNotFound(_))));
    }

    #[tokio::test]
    async fn start_malformed_scenario_reads_as_not_found() {
        let mut source = MockScenarioSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(Some(serde_json::json!({"title": "broken"}))));
        let (catalog, sessions, clock) = engine_parts(source);
        let start = StartScenario::new(catalog, sessions, clock);

        let err = start
            .execute(
                UserId::new("user-1"),
                ScenarioId::new("broken"),
                SessionId::new("sess-1"),
            )
            .await;
        assert!(matches!(err, Err(StartError::ScenarioNotFound(_))));
    }

    #[tokio::test]
    async fn start_entry_statement_missing_from_map_is_data_integrity() {
        let mut doc = sample_scenario_doc();
        doc["starting_statement_id"] = serde_json::json!("stmt_ghost");
        let mut source = MockScenarioSource::new();
        source.expect_fetch().returning(move |_| Ok(Some(doc.clone())));
        let (catalog, sessions, clock) = engine_parts(source);
        let start = StartScenario::new(catalog, sessions, clock);

        let err = start
            .execute(
                UserId::new("user-1"),
                ScenarioId::new("sc001"),
                SessionId::new("sess-1"),
            )
            .await;
        assert!(matches!(err, Err(StartError::DataIntegrity(_))));
    }

    #[tokio::test]
    async fn restart_resets_session_progress() {
        let mut source = MockScenarioSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(Some(sample_scenario_doc())));
        let (catalog, sessions, clock) = engine_parts(source);
        let start = StartScenario::new(catalog, sessions.clone(), clock);

        for _ in 0..2 {
            start
                .execute(
                    UserId::new("user-1"),
                    ScenarioId::new("sc001"),
                    SessionId::new("sess-1"),
                )
                .await
                .expect("start");
        }
        assert_eq!(sessions.len(), 1);
    }
}
