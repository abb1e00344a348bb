// League and manager history domain types.
//
// These are read-only inputs fetched from the league history provider and
// consumed by tendency inference. Nothing here is persisted by the engine.

use serde::{Deserialize, Serialize};

/// One week of scoring for a manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub week: u32,
    pub points: f64,
}

/// Historical record for a single manager in a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerHistory {
    /// Display name of the manager/team.
    pub manager_name: String,
    /// Provider roster identifier.
    pub roster_id: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
    /// Week-by-week scoring, in week order.
    #[serde(default)]
    pub weekly_scores: Vec<WeeklyScore>,
    /// Player names on the manager's most recent roster, in roster order
    /// (earliest-acquired first, which approximates draft order).
    #[serde(default)]
    pub roster_players: Vec<String>,
}

impl ManagerHistory {
    /// Games played so far.
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win rate in [0, 1]; 0.5 when no games have been played.
    pub fn win_rate(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            0.5
        } else {
            f64::from(self.wins) / f64::from(games)
        }
    }

    /// Points-for over points-against; 1.0 when either side is unknown.
    pub fn points_ratio(&self) -> f64 {
        if self.points_against <= 0.0 || !self.points_for.is_finite() {
            1.0
        } else {
            (self.points_for / self.points_against).clamp(0.0, 3.0)
        }
    }

    /// Average weekly score; `None` with no weekly data.
    pub fn average_weekly_points(&self) -> Option<f64> {
        if self.weekly_scores.is_empty() {
            return None;
        }
        let sum: f64 = self.weekly_scores.iter().map(|w| w.points).sum();
        Some(sum / self.weekly_scores.len() as f64)
    }
}

/// Full league history as returned by the history provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueHistory {
    pub league_id: String,
    pub season: String,
    /// Whether the league is a dynasty (multi-year keeper) format.
    pub dynasty: bool,
    /// Whether the league starts a second quarterback slot.
    #[serde(default)]
    pub superflex: bool,
    /// One entry per manager, in roster-id order.
    pub managers: Vec<ManagerHistory>,
}
