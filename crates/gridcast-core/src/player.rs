// Player positions, ranking pool entries, and name normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions tracked by the ranking pool and the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
}

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Handles the common provider abbreviations ("QB", "RB", "WR", "TE").
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
        }
    }

    /// Whether this position catches passes from a quarterback (stacking
    /// partners for same-team pairings).
    pub fn is_pass_catcher(&self) -> bool {
        matches!(self, Position::WideReceiver | Position::TightEnd)
    }

    /// Deterministic ordering index for display and stable iteration.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Quarterback => 0,
            Position::RunningBack => 1,
            Position::WideReceiver => 2,
            Position::TightEnd => 3,
        }
    }

    /// All tracked positions, in sort order.
    pub const ALL: [Position; 4] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Ranking pool entries
// ---------------------------------------------------------------------------

/// A single draftable player in the external ranking pool.
///
/// Immutable snapshot per invocation; the pool itself is owned by the ranking
/// provider, and the engine only ever works on copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingPoolEntry {
    /// Player display name as reported by the provider.
    pub name: String,
    pub position: Position,
    /// NFL team abbreviation, when the provider knows it.
    pub team: Option<String>,
    /// Consensus rank; lower numbers draft earlier.
    pub rank: f64,
    pub age: Option<u8>,
    /// Market/trade value in the provider's own units.
    pub market_value: f64,
}

impl RankingPoolEntry {
    /// Replace non-finite numerics with safe values so one malformed upstream
    /// record cannot leak NaN/Infinity into aggregate scores.
    pub fn sanitize(mut self) -> Self {
        if !self.rank.is_finite() || self.rank < 0.0 {
            self.rank = f64::from(u16::MAX);
        }
        if !self.market_value.is_finite() || self.market_value < 0.0 {
            self.market_value = 0.0;
        }
        self
    }
}

/// A short-horizon, news-driven rank adjustment reported by the ranking
/// provider alongside the pool. The `reasons` strings are treated as
/// authoritative explanations when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingAdjustment {
    pub name: String,
    /// Rank delta already applied by the provider (negative = moved up).
    pub delta: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Normalize a player name for cross-source matching.
///
/// Lowercases, strips punctuation, collapses whitespace, and drops generational
/// suffixes ("jr", "sr", "ii"–"v") so "Marvin Harrison Jr." from one provider
/// matches "marvin harrison" from another.
pub fn normalize_player_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|part| !matches!(*part, "jr" | "sr" | "ii" | "iii" | "iv" | "v"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_known_positions() {
        assert_eq!(Position::from_str_pos("QB"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("RB"), Some(Position::RunningBack));
        assert_eq!(Position::from_str_pos("WR"), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("TE"), Some(Position::TightEnd));
    }

    #[test]
    fn from_str_pos_case_insensitive() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("Wr"), Some(Position::WideReceiver));
    }

    #[test]
    fn from_str_pos_invalid() {
        assert_eq!(Position::from_str_pos("K"), None);
        assert_eq!(Position::from_str_pos("DEF"), None);
        assert_eq!(Position::from_str_pos(""), None);
    }

    #[test]
    fn display_str_roundtrip() {
        for pos in Position::ALL {
            assert_eq!(Position::from_str_pos(pos.display_str()), Some(pos));
        }
    }

    #[test]
    fn is_pass_catcher() {
        assert!(Position::WideReceiver.is_pass_catcher());
        assert!(Position::TightEnd.is_pass_catcher());
        assert!(!Position::Quarterback.is_pass_catcher());
        assert!(!Position::RunningBack.is_pass_catcher());
    }

    #[test]
    fn sanitize_replaces_nan_rank() {
        let entry = RankingPoolEntry {
            name: "Broken Player".into(),
            position: Position::RunningBack,
            team: None,
            rank: f64::NAN,
            age: Some(24),
            market_value: 1000.0,
        }
        .sanitize();
        assert!(entry.rank.is_finite());
        assert!(entry.rank > 1000.0, "NaN rank should sink to the pool floor");
    }

    #[test]
    fn sanitize_replaces_infinite_market_value() {
        let entry = RankingPoolEntry {
            name: "Broken Player".into(),
            position: Position::WideReceiver,
            team: None,
            rank: 10.0,
            age: None,
            market_value: f64::INFINITY,
        }
        .sanitize();
        assert_eq!(entry.market_value, 0.0);
    }

    #[test]
    fn sanitize_keeps_valid_values() {
        let entry = RankingPoolEntry {
            name: "Fine Player".into(),
            position: Position::TightEnd,
            team: Some("KC".into()),
            rank: 12.5,
            age: Some(27),
            market_value: 4200.0,
        }
        .sanitize();
        assert_eq!(entry.rank, 12.5);
        assert_eq!(entry.market_value, 4200.0);
    }

    #[test]
    fn normalize_strips_suffix_and_punctuation() {
        assert_eq!(normalize_player_name("Marvin Harrison Jr."), "marvin harrison");
        assert_eq!(normalize_player_name("A.J. Brown"), "a j brown");
        assert_eq!(normalize_player_name("Kenneth Walker III"), "kenneth walker");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_player_name("  Ja'Marr   Chase "), "ja marr chase");
    }

    #[test]
    fn normalize_matches_across_sources() {
        assert_eq!(
            normalize_player_name("Michael Pittman Jr."),
            normalize_player_name("michael pittman")
        );
    }
}
