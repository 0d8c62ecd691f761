//! Scenario discovery and suggestion.
//!
//! `available_scenarios` exposes the catalog listing. `suggest_for_user`
//! is a deliberately simple heuristic: a keyword table maps the user's
//! free-text description to an issue label, and the stored manager-type
//! preference breaks ties between scenarios covering the same issue.

use std::sync::Arc;

use serde::Serialize;

use ethos_domain::UserId;

use crate::catalog::{CatalogError, ScenarioCatalog, ScenarioListing};
use crate::infrastructure::ports::PreferenceSource;

// Scanned in order; the first issue with a matching keyword wins.
const ISSUE_KEYWORDS: &[(&str, &[&str])] = &[
    ("safety", &["safety", "unsafe", "hazard", "injury", "review"]),
    ("data privacy", &["privacy", "personal data", "data", "tracking"]),
    (
        "financial reporting",
        &["budget", "invoice", "accounting", "numbers", "expense"],
    ),
    (
        "harassment",
        &["harass", "bully", "discriminat", "hostile"],
    ),
    (
        "deadline pressure",
        &["deadline", "pressure", "cut corners", "rush", "shortcut"],
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("Scenario source error: {0}")]
    Source(String),
    #[error("No scenarios available")]
    NoScenarios,
}

impl From<CatalogError> for SuggestError {
    fn from(e: CatalogError) -> Self {
        Self::Source(e.to_string())
    }
}

/// A suggested scenario with its display labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSuggestion {
    pub scenario: ScenarioListing,
    /// Issue label matched from the free text, when any keyword hit.
    pub matched_issue: Option<String>,
    /// The user's stored manager-type preference, when present.
    pub preferred_manager_type: Option<String>,
}

pub struct SuggestScenario {
    catalog: Arc<ScenarioCatalog>,
    preferences: Arc<dyn PreferenceSource>,
}

impl SuggestScenario {
    pub fn new(catalog: Arc<ScenarioCatalog>, preferences: Arc<dyn PreferenceSource>) -> Self {
        Self {
            catalog,
            preferences,
        }
    }

    /// Catalog metadata for every known scenario.
    pub async fn available_scenarios(&self) -> Result<Vec<ScenarioListing>, SuggestError> {
        Ok(self.catalog.listings().await?)
    }

    pub async fn suggest_for_user(
        &self,
        user_id: &UserId,
        free_text: &str,
    ) -> Result<ScenarioSuggestion, SuggestError> {
        let listings = self.catalog.listings().await?;
        if listings.is_empty() {
            return Err(SuggestError::NoScenarios);
        }

        let matched_issue = match_issue(free_text);
        let preferred_manager_type = match self.preferences.manager_type(user_id).await {
            Ok(preference) => preference,
            // Preference lookup only biases the pick; a failed lookup must
            // not fail the suggestion.
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "preference lookup failed");
                None
            }
        };

        let scenario = pick(&listings, matched_issue.as_deref(), preferred_manager_type.as_deref());
        tracing::debug!(
            user_id = %user_id,
            scenario_id = %scenario.id,
            issue = ?matched_issue,
            "scenario suggested"
        );

        Ok(ScenarioSuggestion {
            scenario: scenario.clone(),
            matched_issue,
            preferred_manager_type,
        })
    }
}

fn match_issue(free_text: &str) -> Option<String> {
    let text = free_text.to_lowercase();
    ISSUE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(issue, _)| (*issue).to_string())
}

/// Pick by issue match first, manager-type preference second, catalog
/// order last.
fn pick<'a>(
    listings: &'a [ScenarioListing],
    issue: Option<&str>,
    manager_type: Option<&str>,
) -> &'a ScenarioListing {
    let matches_issue = |l: &ScenarioListing| {
        issue.is_some_and(|issue| l.issue.eq_ignore_ascii_case(issue))
    };
    let matches_manager = |l: &ScenarioListing| {
        manager_type.is_some_and(|mt| l.manager_type.eq_ignore_ascii_case(mt))
    };

    listings
        .iter()
        .find(|l| matches_issue(l) && matches_manager(l))
        .or_else(|| listings.iter().find(|l| matches_issue(l)))
        .or_else(|| listings.iter().find(|l| matches_manager(l)))
        .unwrap_or(&listings[0])
}
