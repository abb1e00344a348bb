// Week-over-week board drift tracking.

pub mod tracker;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use gridcast_core::player::{Position, RankingPoolEntry};

use crate::dna::{Archetype, ManagerDna};

pub use tracker::compute_drift_report;

// ---------------------------------------------------------------------------
// Week keys
// ---------------------------------------------------------------------------

/// ISO-week key for a timestamp, e.g. "2026-W32".
pub fn iso_week_key(at: DateTime<Utc>) -> String {
    let week = at.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// ISO-week key for the week before the given timestamp.
pub fn previous_iso_week_key(at: DateTime<Utc>) -> String {
    iso_week_key(at - Duration::days(7))
}

/// Store key for a league's snapshot in a given week.
pub fn drift_store_key(league_id: &str, week_key: &str) -> String {
    format!("drift:{league_id}:{week_key}")
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One league's board and manager profiles captured for a single ISO week.
/// Written idempotently (last write wins) and read by the next week's run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDriftSnapshot {
    pub league_id: String,
    pub week_key: String,
    pub entries: Vec<RankingPoolEntry>,
    pub manager_dna: Vec<ManagerDna>,
    pub saved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftSeverity {
    Minor,
    Moderate,
    Major,
}

impl DriftSeverity {
    /// Classify an absolute rank movement.
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 8.0 {
            DriftSeverity::Major
        } else if magnitude >= 4.0 {
            DriftSeverity::Moderate
        } else {
            DriftSeverity::Minor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftDirection {
    Rising,
    Falling,
}

/// One player's week-over-week rank movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDrift {
    pub name: String,
    pub position: Position,
    pub previous_rank: f64,
    pub current_rank: f64,
    /// `current_rank - previous_rank`; negative means the player rose.
    pub drift: f64,
    pub severity: DriftSeverity,
    pub direction: DriftDirection,
    pub reason: String,
}

/// A manager signal that moved by at least the reporting threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnaShift {
    pub manager: String,
    pub signal: String,
    pub previous: f64,
    pub current: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeShift {
    pub manager: String,
    pub previous: Archetype,
    pub current: Archetype,
}

/// Market movement relevant to one of the target manager's upcoming picks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickWindowOutlook {
    pub overall: u32,
    pub round: u32,
    pub pick: u32,
    /// Rank window considered relevant to this pick.
    pub window_low: f64,
    pub window_high: f64,
    pub risers: Vec<String>,
    pub fallers: Vec<String>,
    pub new_entrants: Vec<String>,
}

/// Full weekly drift report for a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDriftReport {
    pub league_id: String,
    pub week_key: String,
    /// True on the first run for a league, before any prior week exists.
    pub baseline: bool,
    pub headline: String,
    pub top_risers: Vec<PlayerDrift>,
    pub top_fallers: Vec<PlayerDrift>,
    pub dna_shifts: Vec<DnaShift>,
    pub archetype_shifts: Vec<ArchetypeShift>,
    pub pick_outlook: Vec<PickWindowOutlook>,
}
