// Retrospective accuracy scoring and weight calibration.

pub mod calibrate;

use serde::{Deserialize, Serialize};

use gridcast_core::weights::CalibrationWeights;

pub use calibrate::{classify_miss, evaluate_draft, updated_weights};

// ---------------------------------------------------------------------------
// Miss reasons
// ---------------------------------------------------------------------------

/// Why a confident prediction missed. Assigned by an ordered rule cascade;
/// the first matching reason wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// The actual pick came from a different position entirely.
    PositionSurprise,
    /// Manager-bias terms dominated the predicted score.
    TendencyOverweighted,
    /// Rank-consensus terms dominated the predicted score.
    AdpDriven,
    /// News-sensitive terms carried outsized weight.
    NewsDriven,
    /// The actual pick was on the shortlist, just not on top.
    CloseCall,
    /// Nothing in the model pointed at the actual pick.
    Unpredicted,
}

impl MissReason {
    pub fn label(&self) -> &'static str {
        match self {
            MissReason::PositionSurprise => "position surprise",
            MissReason::TendencyOverweighted => "tendency overweighted",
            MissReason::AdpDriven => "ADP-driven miss",
            MissReason::NewsDriven => "news-driven miss",
            MissReason::CloseCall => "close call",
            MissReason::Unpredicted => "unpredicted pick",
        }
    }
}

// ---------------------------------------------------------------------------
// Accuracy records
// ---------------------------------------------------------------------------

/// One notable prediction, kept as a manager's best call or worst miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub overall: u32,
    pub player: String,
    /// Probability the model assigned, 0-100.
    pub probability: u8,
}

/// Prediction accuracy for a single manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerAccuracy {
    pub manager: String,
    pub picks_evaluated: u32,
    /// Predicted top target equaled the actual pick.
    pub exact_hits: u32,
    /// Actual pick appeared anywhere on the shortlist.
    pub top3_hits: u32,
    /// Mean probability the model had assigned to whatever was actually
    /// picked (zero when the pick was off the shortlist).
    pub avg_assigned_probability: f64,
    pub best_call: Option<CallRecord>,
    pub worst_miss: Option<CallRecord>,
}

impl ManagerAccuracy {
    pub fn exact_rate(&self) -> f64 {
        if self.picks_evaluated == 0 {
            0.0
        } else {
            f64::from(self.exact_hits) / f64::from(self.picks_evaluated)
        }
    }

    pub fn top3_rate(&self) -> f64 {
        if self.picks_evaluated == 0 {
            0.0
        } else {
            f64::from(self.top3_hits) / f64::from(self.picks_evaluated)
        }
    }
}

/// An explained confident miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissExplanation {
    pub overall: u32,
    pub manager: String,
    pub predicted: String,
    pub predicted_probability: u8,
    pub actual: String,
    pub reason: MissReason,
}

/// Full retrospective output: accuracy per manager, explained misses, and the
/// recalibrated weights that were persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrospectiveReport {
    pub league_id: String,
    pub season: String,
    pub picks_evaluated: u32,
    pub exact_hits: u32,
    pub top3_hits: u32,
    pub managers: Vec<ManagerAccuracy>,
    pub misses: Vec<MissExplanation>,
    pub weights: CalibrationWeights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_reason_labels() {
        assert_eq!(MissReason::PositionSurprise.label(), "position surprise");
        assert_eq!(MissReason::TendencyOverweighted.label(), "tendency overweighted");
        assert_eq!(MissReason::AdpDriven.label(), "ADP-driven miss");
        assert_eq!(MissReason::NewsDriven.label(), "news-driven miss");
        assert_eq!(MissReason::CloseCall.label(), "close call");
        assert_eq!(MissReason::Unpredicted.label(), "unpredicted pick");
    }

    #[test]
    fn rates_guard_division_by_zero() {
        let accuracy = ManagerAccuracy {
            manager: "Empty".into(),
            picks_evaluated: 0,
            exact_hits: 0,
            top3_hits: 0,
            avg_assigned_probability: 0.0,
            best_call: None,
            worst_miss: None,
        };
        assert_eq!(accuracy.exact_rate(), 0.0);
        assert_eq!(accuracy.top3_rate(), 0.0);
    }

    #[test]
    fn rates_computed() {
        let accuracy = ManagerAccuracy {
            manager: "Half".into(),
            picks_evaluated: 10,
            exact_hits: 5,
            top3_hits: 8,
            avg_assigned_probability: 22.0,
            best_call: None,
            worst_miss: None,
        };
        assert_eq!(accuracy.exact_rate(), 0.5);
        assert_eq!(accuracy.top3_rate(), 0.8);
    }
}
