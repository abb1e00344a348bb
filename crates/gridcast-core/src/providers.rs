// External provider contracts.
//
// The engine never talks to a league platform directly; it consumes these
// traits. Provider failures are surfaced to callers as-is: a degraded
// ranking pool would silently halve simulation quality without any signal,
// so nothing here is swallowed or defaulted.

use async_trait::async_trait;
use thiserror::Error;

use crate::draft::DraftResult;
use crate::history::LeagueHistory;
use crate::player::{RankingAdjustment, RankingPoolEntry};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: &'static str, message: String },

    #[error("{provider} returned malformed data: {message}")]
    Malformed { provider: &'static str, message: String },

    #[error("{provider} I/O failure: {source}")]
    Io {
        provider: &'static str,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// League format
// ---------------------------------------------------------------------------

/// Which ranking board to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueFormat {
    Redraft,
    Dynasty,
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// A fetched ranking pool plus any news-driven adjustments the provider
/// already applied to it.
#[derive(Debug, Clone)]
pub struct RankingPoolFetch {
    pub entries: Vec<RankingPoolEntry>,
    pub adjustments: Vec<RankingAdjustment>,
}

/// Source of the current ranked player pool.
#[async_trait]
pub trait RankingProvider: Send + Sync {
    async fn fetch_pool(
        &self,
        format: LeagueFormat,
        size: usize,
    ) -> Result<RankingPoolFetch, ProviderError>;
}

/// Source of league standings, weekly scoring, and roster history.
#[async_trait]
pub trait LeagueHistoryProvider: Send + Sync {
    async fn fetch_history(&self, league_id: &str) -> Result<LeagueHistory, ProviderError>;
}

/// Source of the most recent completed real draft for a league.
#[async_trait]
pub trait DraftResultProvider: Send + Sync {
    async fn fetch_latest_draft(&self, league_id: &str) -> Result<DraftResult, ProviderError>;
}
