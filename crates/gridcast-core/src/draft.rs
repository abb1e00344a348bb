// Completed-draft records imported from the draft result provider.

use serde::{Deserialize, Serialize};

use crate::player::Position;

/// A single pick from a real, completed draft. Imported verbatim; append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualDraftPick {
    /// Sequential overall pick number (1-indexed).
    pub overall: u32,
    pub round: u32,
    /// Pick number within the round (1-indexed).
    pub pick: u32,
    pub roster_id: u32,
    /// Provider player identifier.
    pub player_id: String,
    pub player_name: String,
    pub position: Position,
    /// Display name of the manager who made the pick.
    pub manager: String,
}

/// The most recent real draft for a league, in pick order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftResult {
    pub league_id: String,
    pub season: String,
    pub picks: Vec<ActualDraftPick>,
}

impl DraftResult {
    /// Look up the pick at an overall slot, if the draft reached it.
    pub fn pick_at(&self, overall: u32) -> Option<&ActualDraftPick> {
        self.picks.iter().find(|p| p.overall == overall)
    }
}
