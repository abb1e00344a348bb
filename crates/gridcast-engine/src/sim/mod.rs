// Monte Carlo snake-draft simulation.

pub mod aggregate;
pub mod order;
pub mod scoring;
pub mod simulate;

use serde::{Deserialize, Serialize};

use gridcast_core::player::Position;

pub use aggregate::OutcomeAggregator;
pub use simulate::run_trials;

// ---------------------------------------------------------------------------
// Request and scenario types
// ---------------------------------------------------------------------------

/// A forced positional run: for picks inside a short window before
/// `before_overall`, selection is restricted to the top remaining players of
/// `position`. Models "what if a run develops just ahead of my pick".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcedRun {
    pub position: Position,
    pub before_overall: u32,
}

/// Optional conditioning applied to every trial. Both fields compose.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// A player excluded from the pool for the whole trial.
    #[serde(default)]
    pub removed_player: Option<String>,
    #[serde(default)]
    pub forced_run: Option<ForcedRun>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.removed_player.is_none() && self.forced_run.is_none()
    }
}

/// Parameters for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub team_count: usize,
    pub rounds: usize,
    /// The user's draft slot, 1-indexed.
    pub user_slot: usize,
    pub trials: usize,
    pub superflex: bool,
    /// How many top-ranked remaining players are scored per pick.
    pub candidate_pool: usize,
    pub shortlist_size: usize,
    pub scenario: Option<Scenario>,
}

impl SimulationRequest {
    /// Total picks in one trial.
    pub fn total_picks(&self) -> u32 {
        (self.team_count * self.rounds) as u32
    }
}
