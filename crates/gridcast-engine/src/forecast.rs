// Forecast output types: the shortlists callers consume and the snapshot the
// retrospective later scores against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gridcast_core::player::Position;

use crate::sim::scoring::ScoreComponents;

/// One shortlisted player at a pick of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    pub player: String,
    pub position: Position,
    /// Percentage of trials in which this player landed at the slot, 0-100.
    pub probability: u8,
    /// Average scoring-component magnitudes across the trials that chose
    /// this player here.
    pub components: ScoreComponents,
    pub rationale: String,
}

/// Forecast for a single overall pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickForecast {
    pub overall: u32,
    pub round: u32,
    pub pick: u32,
    /// Manager on the clock at this slot.
    pub manager: String,
    pub top_targets: Vec<TargetEntry>,
    /// Shortlist under the requested scenario, when one was run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_targets: Option<Vec<TargetEntry>>,
}

/// A stored prediction run: one forecast per overall slot, created once per
/// request and read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSnapshot {
    pub league_id: String,
    pub season: String,
    pub trials: usize,
    pub picks: Vec<PickForecast>,
    pub created_at: DateTime<Utc>,
}

impl PredictionSnapshot {
    /// Store key for a league/season prediction.
    pub fn store_key(league_id: &str, season: &str) -> String {
        format!("prediction:{league_id}:{season}")
    }

    /// The forecast at an overall slot, if recorded.
    pub fn pick_at(&self, overall: u32) -> Option<&PickForecast> {
        self.picks.iter().find(|p| p.overall == overall)
    }
}
