// CSV ranking-pool loading.
//
// Reads consensus-board CSV exports: one row per player with Name, Pos, Team,
// Rank, Age, and Value columns. Used as the offline RankingProvider for the
// CLI and for tests.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::player::{Position, RankingPoolEntry};
use crate::providers::{LeagueFormat, ProviderError, RankingPoolFetch, RankingProvider};

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One board row. Rank and Value are f64 because some exports carry fractional
/// consensus ranks. Extra columns are silently absorbed via `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawBoardRow {
    Name: String,
    #[serde(alias = "Position")]
    Pos: String,
    #[serde(default)]
    Team: String,
    #[serde(alias = "ADP")]
    Rank: f64,
    #[serde(default)]
    Age: Option<f64>,
    #[serde(alias = "MarketValue", default)]
    Value: f64,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parse board rows from any reader. Malformed rows, unknown positions, and
/// non-finite ranks are skipped with a warning rather than failing the load.
pub fn load_rankings_from_reader<R: Read>(rdr: R) -> Result<Vec<RankingPoolEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawBoardRow>() {
        match result {
            Ok(raw) => {
                let Some(position) = Position::from_str_pos(raw.Pos.trim()) else {
                    warn!(
                        "skipping '{}': unknown position '{}'",
                        raw.Name.trim(),
                        raw.Pos.trim()
                    );
                    continue;
                };
                if !raw.Rank.is_finite() {
                    warn!("skipping '{}': non-finite rank", raw.Name.trim());
                    continue;
                }
                let team = {
                    let t = raw.Team.trim();
                    if t.is_empty() { None } else { Some(t.to_string()) }
                };
                entries.push(
                    RankingPoolEntry {
                        name: raw.Name.trim().to_string(),
                        position,
                        team,
                        rank: raw.Rank,
                        age: raw.Age.filter(|a| a.is_finite() && *a > 0.0).map(|a| a.round() as u8),
                        market_value: raw.Value,
                    }
                    .sanitize(),
                );
            }
            Err(e) => {
                warn!("skipping malformed board row: {}", e);
            }
        }
    }
    entries.sort_by(|a, b| a.rank.partial_cmp(&b.rank).unwrap_or(std::cmp::Ordering::Equal));
    Ok(entries)
}

/// Load a ranking board from a CSV file on disk.
pub fn load_rankings(path: &Path) -> Result<Vec<RankingPoolEntry>, ProviderError> {
    let file = std::fs::File::open(path).map_err(|e| ProviderError::Io {
        provider: "csv-rankings",
        source: e,
    })?;
    load_rankings_from_reader(file).map_err(|e| ProviderError::Malformed {
        provider: "csv-rankings",
        message: format!("{} in {}", e, path.display()),
    })
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// Offline RankingProvider backed by a single CSV board file.
///
/// The file is assumed to match the league's configured format; the `format`
/// argument only matters for providers that serve multiple boards.
pub struct CsvRankingProvider {
    path: PathBuf,
}

impl CsvRankingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvRankingProvider { path: path.into() }
    }
}

#[async_trait]
impl RankingProvider for CsvRankingProvider {
    async fn fetch_pool(
        &self,
        _format: LeagueFormat,
        size: usize,
    ) -> Result<RankingPoolFetch, ProviderError> {
        let mut entries = load_rankings(&self.path)?;
        entries.truncate(size);
        Ok(RankingPoolFetch {
            entries,
            adjustments: Vec::new(),
        })
    }
}
