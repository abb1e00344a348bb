// Calibration weight multipliers, the only long-lived mutable state the
// engine owns. One row per league/season, updated in place by the
// retrospective calibrator and read back by subsequent simulation runs.

use serde::{Deserialize, Serialize};

/// Lower clamp applied to every weight on update.
pub const WEIGHT_FLOOR: f64 = 0.6;
/// Upper clamp applied to every weight on update.
pub const WEIGHT_CEILING: f64 = 1.6;

/// Scoring-weight multipliers for the five candidate-score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationWeights {
    pub league_id: String,
    pub season: String,
    /// Multiplier on the rank-consensus (value-vs-slot) term.
    pub adp: f64,
    /// Multiplier on the roster-need term.
    pub need: f64,
    /// Multiplier on the manager-tendency and run-panic terms.
    pub tendency: f64,
    /// Multiplier on the market-value (news-sensitive) term.
    pub news: f64,
    /// Multiplier on the rookie-appetite bonus.
    pub rookie: f64,
    /// Cumulative number of evaluated picks that fed these weights.
    pub sample_size: u32,
}

impl CalibrationWeights {
    /// Neutral weights for a league/season with no retrospective history.
    pub fn neutral(league_id: &str, season: &str) -> Self {
        CalibrationWeights {
            league_id: league_id.to_string(),
            season: season.to_string(),
            adp: 1.0,
            need: 1.0,
            tendency: 1.0,
            news: 1.0,
            rookie: 1.0,
            sample_size: 0,
        }
    }

    /// Clamp every multiplier into the given bounds. Non-finite values
    /// (which can only arise from corrupted stored rows) reset to 1.0.
    pub fn clamped(mut self, floor: f64, ceiling: f64) -> Self {
        for w in [
            &mut self.adp,
            &mut self.need,
            &mut self.tendency,
            &mut self.news,
            &mut self.rookie,
        ] {
            if !w.is_finite() {
                *w = 1.0;
            }
            *w = w.clamp(floor, ceiling);
        }
        self
    }
}
