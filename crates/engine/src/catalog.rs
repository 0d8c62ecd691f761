//! Memoized scenario catalog.
//!
//! Scenario definitions are immutable for the process lifetime, so the
//! first successful load of an id parses and caches it; every later load
//! returns the shared `Arc`. An absent document is a miss, never cached,
//! so a scenario published after the first request becomes visible on the
//! next call. Parse failures are likewise not cached.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use ethos_domain::{DomainError, ScenarioDefinition, ScenarioId};

use crate::infrastructure::ports::{ScenarioSource, SourceError};

/// Errors surfaced by catalog loads.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Scenario source error: {0}")]
    Source(#[from] SourceError),
    #[error("Malformed scenario {id}: {reason}")]
    Malformed { id: ScenarioId, reason: DomainError },
}

/// Catalog metadata for a single scenario, as exposed by listings.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScenarioListing {
    pub id: ScenarioId,
    pub title: String,
    pub description: String,
    pub issue: String,
    pub manager_type: String,
}

impl From<&ScenarioDefinition> for ScenarioListing {
    fn from(scenario: &ScenarioDefinition) -> Self {
        Self {
            id: scenario.id.clone(),
            title: scenario.title.clone(),
            description: scenario.description.clone(),
            issue: scenario.issue.clone(),
            manager_type: scenario.manager_type.clone(),
        }
    }
}

pub struct ScenarioCatalog {
    source: Arc<dyn ScenarioSource>,
    cache: DashMap<ScenarioId, Arc<ScenarioDefinition>>,
    // Per-id guards so concurrent first loads parse at most once.
    load_guards: DashMap<ScenarioId, Arc<Mutex<()>>>,
}

impl ScenarioCatalog {
    pub fn new(source: Arc<dyn ScenarioSource>) -> Self {
        Self {
            source,
            cache: DashMap::new(),
            load_guards: DashMap::new(),
        }
    }

    /// Load a scenario definition, fetching and parsing on first use.
    /// Returns `Ok(None)` when no document exists for the id.
    pub async fn load(
        &self,
        id: &ScenarioId,
    ) -> Result<Option<Arc<ScenarioDefinition>>, CatalogError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached.clone()));
        }

        let guard = self
            .load_guards
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _held = guard.lock().await;

        // Another task may have populated the cache while we waited.
        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached.clone()));
        }

        let Some(document) = self.source.fetch(id).await? else {
            tracing::debug!(scenario_id = %id, "scenario document absent");
            return Ok(None);
        };

        let scenario = ScenarioDefinition::from_document(id.clone(), document)
            .map_err(|reason| CatalogError::Malformed {
                id: id.clone(),
                reason,
            })?;

        for overlap in scenario.overlapping_ranges() {
            tracing::warn!(scenario_id = %id, %overlap, "overlapping score ranges");
        }
        tracing::info!(
            scenario_id = %id,
            statements = scenario.statements.len(),
            endings = scenario.endings.len(),
            "scenario loaded into catalog"
        );

        let scenario = Arc::new(scenario);
        self.cache.insert(id.clone(), scenario.clone());
        Ok(Some(scenario))
    }

    /// Ids of all scenarios known to the source.
    pub async fn known_ids(&self) -> Result<Vec<ScenarioId>, CatalogError> {
        Ok(self.source.list().await?)
    }

    /// Listing metadata for every known scenario. Unloadable entries are
    /// skipped with a warning rather than failing the whole listing.
    pub async fn listings(&self) -> Result<Vec<ScenarioListing>, CatalogError> {
        let mut listings = Vec::new();
        for id in self.known_ids().await? {
            match self.load(&id).await {
                Ok(Some(scenario)) => listings.push(ScenarioListing::from(scenario.as_ref())),
                Ok(None) => {}
                Err(CatalogError::Malformed { id, reason }) => {
                    tracing::warn!(scenario_id = %id, error = %reason, "skipping malformed scenario in listing");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(listings)
    }
}
