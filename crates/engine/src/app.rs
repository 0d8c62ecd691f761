//! Engine composition.

use std::sync::Arc;

use ethos_domain::{ScenarioId, SessionId, UserId};

use crate::catalog::{ScenarioCatalog, ScenarioListing};
use crate::infrastructure::ports::{ClockPort, PreferenceSource, ScenarioSource, SystemClock};
use crate::stores::SessionStore;
use crate::use_cases::{
    AdvanceError, ChoiceResult, ProcessChoice, ScenarioSuggestion, StartError, StartScenario,
    StartedSession, SuggestError, SuggestScenario,
};

/// Wires the catalog, session registry, and use cases behind one facade.
///
/// The session registry is owned here and injected into the use cases, so
/// callers decide the engine's lifetime (and with it the lifetime of all
/// session state, which is never evicted).
pub struct Engine {
    start: StartScenario,
    advance: ProcessChoice,
    suggest: SuggestScenario,
    sessions: Arc<SessionStore>,
}

impl Engine {
    pub fn new(
        scenarios: Arc<dyn ScenarioSource>,
        preferences: Arc<dyn PreferenceSource>,
    ) -> Self {
        Self::with_clock(scenarios, preferences, Arc::new(SystemClock))
    }

    pub fn with_clock(
        scenarios: Arc<dyn ScenarioSource>,
        preferences: Arc<dyn PreferenceSource>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let catalog = Arc::new(ScenarioCatalog::new(scenarios));
        let sessions = Arc::new(SessionStore::new());
        Self {
            start: StartScenario::new(catalog.clone(), sessions.clone(), clock.clone()),
            advance: ProcessChoice::new(catalog.clone(), sessions.clone(), clock),
            suggest: SuggestScenario::new(catalog, preferences),
            sessions,
        }
    }

    pub async fn start_scenario(
        &self,
        user_id: UserId,
        scenario_id: ScenarioId,
        session_id: SessionId,
    ) -> Result<StartedSession, StartError> {
        self.start.execute(user_id, scenario_id, session_id).await
    }

    pub async fn process_choice(
        &self,
        user_id: UserId,
        scenario_id: ScenarioId,
        session_id: SessionId,
        choice_index: usize,
        current_statement_id: Option<&str>,
    ) -> Result<ChoiceResult, AdvanceError> {
        self.advance
            .execute(
                user_id,
                scenario_id,
                session_id,
                choice_index,
                current_statement_id,
            )
            .await
    }

    pub async fn available_scenarios(&self) -> Result<Vec<ScenarioListing>, SuggestError> {
        self.suggest.available_scenarios().await
    }

    pub async fn suggest_scenario(
        &self,
        user_id: &UserId,
        free_text: &str,
    ) -> Result<ScenarioSuggestion, SuggestError> {
        self.suggest.suggest_for_user(user_id, free_text).await
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}
