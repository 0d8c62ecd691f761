//! Shared builders for unit tests.

use std::sync::Arc;

use serde_json::json;

use crate::catalog::ScenarioCatalog;
use crate::infrastructure::ports::{ClockPort, MockScenarioSource, SystemClock};
use crate::stores::SessionStore;

/// A small but complete branching scenario: two decision statements, one
/// direct ending, and a score-range table on the aggregate statement.
pub(crate) fn sample_scenario_doc() -> serde_json::Value {
    json!({
        "title": "Shortcut under pressure",
        "description": "Your manager wants this week's safety review skipped to hit a deadline.",
        "issue": "safety",
        "manager_type": "authoritarian",
        "starting_statement_id": "stmt_1",
        "statements": {
            "stmt_1": {
                "text": "The review is the only thing between us and the release. Skip it.",
                "user_choices": [
                    {"choice": "Push back with the audit data", "tactic": "Evidence", "EVS": 1, "leads_to": "stmt_2"},
                    {"choice": "Ask why the review is suddenly optional", "tactic": "Questioning", "EVS": 1, "leads_to": "stmt_2"},
                    {"choice": "Agree to skip it", "category": "Compliance", "evs_score": -1, "leads_to": "end_caved"}
                ]
            },
            "stmt_2": {
                "text": "Your manager doubles down and says the decision is made.",
                "user_choices": [
                    {"choice": "Escalate to the safety officer", "tactic": "Escalation", "EVS": 1, "leads_to": "final_score"},
                    {"choice": "Let it drop", "tactic": "Avoidance", "EVS": 0, "leads_to": "final_score"}
                ]
            },
            "final_score": {
                "text": "",
                "score_ranges": {"0_to_1": "end_mixed", "2_to_10": "end_principled"}
            }
        },
        "endings": {
            "end_caved": "You went along with it. The review was skipped.",
            "end_mixed": {"text": "You raised the issue but let it fade."},
            "end_principled": {"text": "You saw it through. The review happened."}
        }
    })
}

/// Install a tracing subscriber for test diagnostics. Safe to call from
/// every test; only the first call wins.
#[allow(dead_code)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Wire a catalog, session store, and clock around a mocked source.
pub(crate) fn engine_parts(
    source: MockScenarioSource,
) -> (Arc<ScenarioCatalog>, Arc<SessionStore>, Arc<dyn ClockPort>) {
    (
        Arc::new(ScenarioCatalog::new(Arc::new(source))),
        Arc::new(SessionStore::new()),
        Arc::new(SystemClock),
    )
}
