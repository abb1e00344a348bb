// Manager tendency profiles inferred from league history.
//
// A profile is recomputed on demand from roster and performance history and
// never mutated in place; every inference call yields a fresh value.

pub mod archetype;
pub mod inference;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gridcast_core::player::Position;

pub use archetype::{derive_archetype, Archetype};
pub use inference::infer_dna;

// ---------------------------------------------------------------------------
// Panic response levels
// ---------------------------------------------------------------------------

/// How a manager historically reacts to a bad stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanicResponse {
    /// Stays the course after a down week.
    HoldSteady,
    /// Minor lineup churn after losses.
    MildConcern,
    /// Chases points and positional runs.
    Jumpy,
    /// Over-corrects hard after any setback.
    FullPanic,
}

impl PanicResponse {
    /// Map a panic score in [0, 1] onto a discrete response level.
    pub fn from_score(score: f64) -> Self {
        if score < 0.25 {
            PanicResponse::HoldSteady
        } else if score < 0.5 {
            PanicResponse::MildConcern
        } else if score < 0.75 {
            PanicResponse::Jumpy
        } else {
            PanicResponse::FullPanic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanicResponse::HoldSteady => "Hold Steady",
            PanicResponse::MildConcern => "Mild Concern",
            PanicResponse::Jumpy => "Jumpy",
            PanicResponse::FullPanic => "Full Panic",
        }
    }
}

// ---------------------------------------------------------------------------
// Positional bias
// ---------------------------------------------------------------------------

/// How strongly a manager leans into a position by draft phase.
/// All values are 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionalBias {
    pub early: f64,
    pub mid: f64,
    pub late: f64,
}

impl PositionalBias {
    /// Neutral bias for a manager with no usable history.
    pub fn neutral() -> Self {
        PositionalBias {
            early: 50.0,
            mid: 50.0,
            late: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ManagerDna
// ---------------------------------------------------------------------------

/// Inferred behavioral profile for one manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerDna {
    pub manager: String,
    pub roster_id: u32,
    /// Fraction of picks taken notably earlier than consensus, in [0, 1].
    pub reach_frequency: f64,
    /// Per-position draft-phase bias.
    pub aggression: BTreeMap<Position, PositionalBias>,
    /// Appetite for young players, in [0, 1].
    pub rookie_appetite: f64,
    /// Propensity to pair a quarterback with his own pass catchers, in [0, 1].
    pub stack_tendency: f64,
    /// Volatility-driven over-correction score, in [0, 1].
    pub panic_score: f64,
    pub panic_response: PanicResponse,
    pub archetype: Archetype,
}

impl ManagerDna {
    /// Early-phase bias for a position, scaled into [0, 1]. This is the
    /// per-pick tendency term the simulator consumes.
    pub fn tendency(&self, position: Position) -> f64 {
        self.aggression
            .get(&position)
            .map(|b| (b.early / 100.0).clamp(0.0, 1.0))
            .unwrap_or(0.5)
    }
}
