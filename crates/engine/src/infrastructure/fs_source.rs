//! Filesystem scenario source.
//!
//! Scenario documents live as `<id>.json` files under a single directory.
//! This is the production adapter for deployments that ship scenarios as
//! static assets.

use std::path::PathBuf;

use async_trait::async_trait;

use ethos_domain::ScenarioId;

use super::ports::{ScenarioSource, SourceError};

pub struct FileScenarioSource {
    dir: PathBuf,
}

impl FileScenarioSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &ScenarioId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }
}

#[async_trait]
impl ScenarioSource for FileScenarioSource {
    async fn fetch(&self, id: &ScenarioId) -> Result<Option<serde_json::Value>, SourceError> {
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SourceError::io("read_scenario", e)),
        };
        let document = serde_json::from_slice(&bytes).map_err(SourceError::decode)?;
        Ok(Some(document))
    }

    async fn list(&self) -> Result<Vec<ScenarioId>, SourceError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| SourceError::io("list_scenarios", e))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SourceError::io("list_scenarios", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    ids.push(ScenarioId::new(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
