// JSON-file providers for offline runs.
//
// League history and completed-draft results are read from JSON fixtures on
// disk, matching the provider contracts the engine consumes.

use std::path::PathBuf;

use async_trait::async_trait;

use gridcast_core::draft::DraftResult;
use gridcast_core::history::LeagueHistory;
use gridcast_core::providers::{DraftResultProvider, LeagueHistoryProvider, ProviderError};

/// Serves league history and draft results from JSON files.
pub struct JsonFixtureProvider {
    history_path: PathBuf,
    draft_path: PathBuf,
}

impl JsonFixtureProvider {
    pub fn new(history_path: impl Into<PathBuf>, draft_path: impl Into<PathBuf>) -> Self {
        JsonFixtureProvider {
            history_path: history_path.into(),
            draft_path: draft_path.into(),
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        path: &PathBuf,
        provider: &'static str,
    ) -> Result<T, ProviderError> {
        let text = std::fs::read_to_string(path).map_err(|e| ProviderError::Io {
            provider,
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
            provider,
            message: format!("{} in {}", e, path.display()),
        })
    }
}

#[async_trait]
impl LeagueHistoryProvider for JsonFixtureProvider {
    async fn fetch_history(&self, _league_id: &str) -> Result<LeagueHistory, ProviderError> {
        Self::read_json(&self.history_path, "json-history")
    }
}

#[async_trait]
impl DraftResultProvider for JsonFixtureProvider {
    async fn fetch_latest_draft(&self, _league_id: &str) -> Result<DraftResult, ProviderError> {
        Self::read_json(&self.draft_path, "json-draft")
    }
}
