// Per-pick candidate scoring.
//
// Produces the sampling weight for one candidate given the manager on the
// clock, his roster so far, and the pick context, along with the component
// breakdown that prediction snapshots carry for later calibration.

use serde::{Deserialize, Serialize};

use gridcast_core::player::{Position, RankingPoolEntry};
use gridcast_core::weights::CalibrationWeights;

use crate::dna::ManagerDna;
use crate::dna::inference::ROOKIE_AGE_CUTOFF;

// ---------------------------------------------------------------------------
// Roster counts
// ---------------------------------------------------------------------------

/// Positions already selected by one manager inside a single trial. Scoped to
/// that trial and discarded with it.
#[derive(Debug, Clone, Default)]
pub struct RosterCounts {
    counts: [u32; 4],
}

impl RosterCounts {
    pub fn new() -> Self {
        RosterCounts::default()
    }

    pub fn count(&self, position: Position) -> u32 {
        self.counts[position.sort_order() as usize]
    }

    pub fn record(&mut self, position: Position) {
        self.counts[position.sort_order() as usize] += 1;
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Ideal starter count per position; the roster-need term decays as a manager
/// fills up against it.
pub fn position_target(position: Position, superflex: bool) -> u32 {
    match position {
        Position::Quarterback => {
            if superflex {
                2
            } else {
                1
            }
        }
        Position::RunningBack => 5,
        Position::WideReceiver => 5,
        Position::TightEnd => 2,
    }
}

// ---------------------------------------------------------------------------
// Run detection
// ---------------------------------------------------------------------------

/// Window of recent league-wide picks inspected for positional runs.
pub const RUN_WINDOW: usize = 3;

/// A position taken at least twice inside the recent-pick window counts as an
/// active run.
pub fn detect_position_run(recent: &[Position]) -> Option<Position> {
    let window = &recent[recent.len().saturating_sub(RUN_WINDOW)..];
    for pos in Position::ALL {
        if window.iter().filter(|&&p| p == pos).count() >= 2 {
            return Some(pos);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Score components
// ---------------------------------------------------------------------------

/// Magnitude each scoring family contributed to one candidate score. Stored
/// alongside shortlist entries so the retrospective can attribute misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Rank-consensus terms (value-vs-slot plus the reach modifier).
    pub adp: f64,
    /// Roster-need term.
    pub need: f64,
    /// Manager-bias terms (positional tendency plus run panic).
    pub tendency: f64,
    /// Market-value term (the news-sensitive input).
    pub news: f64,
    /// Rookie-appetite bonus.
    pub rookie: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.adp + self.need + self.tendency + self.news + self.rookie
    }

    /// Each component as a share of the total, all zeros when the total is
    /// degenerate.
    pub fn shares(&self) -> ScoreComponents {
        let total = self.total();
        if !(total.is_finite()) || total <= 0.0 {
            return ScoreComponents::default();
        }
        ScoreComponents {
            adp: self.adp / total,
            need: self.need / total,
            tendency: self.tendency / total,
            news: self.news / total,
            rookie: self.rookie / total,
        }
    }

    pub fn accumulate(&mut self, other: &ScoreComponents) {
        self.adp += other.adp;
        self.need += other.need;
        self.tendency += other.tendency;
        self.news += other.news;
        self.rookie += other.rookie;
    }

    pub fn scaled(&self, factor: f64) -> ScoreComponents {
        ScoreComponents {
            adp: self.adp * factor,
            need: self.need * factor,
            tendency: self.tendency * factor,
            news: self.news * factor,
            rookie: self.rookie * factor,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate scoring
// ---------------------------------------------------------------------------

/// Floor applied to sampling weights so no candidate is ever impossible.
pub const MIN_SAMPLING_WEIGHT: f64 = 0.05;

/// Score one candidate for the manager on the clock.
///
/// Returns the raw score plus the component breakdown. The sampling weight
/// used by the trial loop is `max(score, MIN_SAMPLING_WEIGHT)`.
pub fn score_candidate(
    candidate: &RankingPoolEntry,
    dna: &ManagerDna,
    counts: &RosterCounts,
    overall_pick: u32,
    active_run: Option<Position>,
    superflex: bool,
    weights: &CalibrationWeights,
) -> (f64, ScoreComponents) {
    let pos = candidate.position;
    let overall = f64::from(overall_pick);

    // Roster need against the ideal-starters table.
    let need_gap = f64::from(position_target(pos, superflex)) - f64::from(counts.count(pos));
    let need_term = need_gap.clamp(-2.0, 4.0) * 0.25 * weights.need;

    // Manager's positional bias.
    let tendency_term = dna.tendency(pos) * 0.22 * weights.tendency;

    // Value relative to the slot: positive when the board says the player
    // should still be available later. Non-finite ranks read as on-slot.
    let raw_delta = (candidate.rank - overall) / 20.0;
    let value_delta = if raw_delta.is_finite() { raw_delta.clamp(-2.0, 2.0) } else { 0.0 };
    let value_term = value_delta * 0.18 * weights.adp;

    // Intrinsic market value. Non-finite values read as floor value.
    let market_ratio = candidate.market_value / 2500.0;
    let market_ratio = if market_ratio.is_finite() { market_ratio.clamp(0.6, 2.0) } else { 0.6 };
    let market_term = market_ratio * 0.14 * weights.news;

    // Reach-prone managers pull down-board names up; only the down-board
    // side of the delta feeds this term.
    let reach_term = if dna.reach_frequency > 0.5 {
        value_delta.clamp(0.0, 2.0) * 0.15 * weights.adp
    } else {
        0.0
    };

    // An active run at this position triggers the panic response.
    let panic_term = if active_run == Some(pos) {
        dna.panic_score * 0.35 * weights.tendency
    } else {
        0.0
    };

    let rookie_term = match candidate.age {
        Some(age) if age <= ROOKIE_AGE_CUTOFF => dna.rookie_appetite * 0.2 * weights.rookie,
        _ => 0.0,
    };

    let score =
        1.0 + need_term + tendency_term + value_term + market_term + reach_term + panic_term + rookie_term;

    let components = ScoreComponents {
        adp: value_term.abs() + reach_term.abs(),
        need: need_term.abs(),
        tendency: tendency_term.abs() + panic_term.abs(),
        news: market_term.abs(),
        rookie: rookie_term.abs(),
    };

    (if score.is_finite() { score } else { MIN_SAMPLING_WEIGHT }, components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::infer_dna;
    use gridcast_core::history::ManagerHistory;

    fn neutral_dna() -> ManagerDna {
        let manager = ManagerHistory {
            manager_name: "Neutral".into(),
            roster_id: 1,
            wins: 7,
            losses: 7,
            points_for: 1400.0,
            points_against: 1400.0,
            weekly_scores: vec![],
            roster_players: vec![],
        };
        infer_dna(&manager, &[], false, 12)
    }

    fn candidate(pos: Position, rank: f64, value: f64, age: u8) -> RankingPoolEntry {
        RankingPoolEntry {
            name: "Candidate".into(),
            position: pos,
            team: None,
            rank,
            age: Some(age),
            market_value: value,
        }
    }

    fn neutral_weights() -> CalibrationWeights {
        CalibrationWeights::neutral("1", "2025")
    }

    #[test]
    fn position_targets() {
        assert_eq!(position_target(Position::Quarterback, false), 1);
        assert_eq!(position_target(Position::Quarterback, true), 2);
        assert_eq!(position_target(Position::RunningBack, false), 5);
        assert_eq!(position_target(Position::WideReceiver, false), 5);
        assert_eq!(position_target(Position::TightEnd, false), 2);
    }

    #[test]
    fn roster_counts_record_and_read() {
        let mut counts = RosterCounts::new();
        assert_eq!(counts.count(Position::RunningBack), 0);
        counts.record(Position::RunningBack);
        counts.record(Position::RunningBack);
        counts.record(Position::TightEnd);
        assert_eq!(counts.count(Position::RunningBack), 2);
        assert_eq!(counts.count(Position::TightEnd), 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn run_detector_needs_two_in_window() {
        assert_eq!(detect_position_run(&[]), None);
        assert_eq!(detect_position_run(&[Position::RunningBack]), None);
        assert_eq!(
            detect_position_run(&[Position::RunningBack, Position::RunningBack]),
            Some(Position::RunningBack)
        );
        assert_eq!(
            detect_position_run(&[
                Position::RunningBack,
                Position::WideReceiver,
                Position::RunningBack
            ]),
            Some(Position::RunningBack)
        );
    }

    #[test]
    fn run_detector_only_looks_at_last_three() {
        let picks = [
            Position::TightEnd,
            Position::TightEnd,
            Position::RunningBack,
            Position::WideReceiver,
            Position::Quarterback,
        ];
        assert_eq!(detect_position_run(&picks), None);
    }

    #[test]
    fn unmet_need_scores_higher_than_met_need() {
        let dna = neutral_dna();
        let weights = neutral_weights();
        let player = candidate(Position::RunningBack, 10.0, 5000.0, 25);

        let empty = RosterCounts::new();
        let mut full = RosterCounts::new();
        for _ in 0..6 {
            full.record(Position::RunningBack);
        }

        let (hungry, _) = score_candidate(&player, &dna, &empty, 10, None, false, &weights);
        let (sated, _) = score_candidate(&player, &dna, &full, 10, None, false, &weights);
        assert!(hungry > sated);
    }

    #[test]
    fn later_ranked_player_scores_higher_value_term_at_same_slot() {
        let dna = neutral_dna();
        let weights = neutral_weights();
        let counts = RosterCounts::new();

        let early = candidate(Position::WideReceiver, 5.0, 5000.0, 25);
        let late = candidate(Position::WideReceiver, 30.0, 5000.0, 25);

        let (_, early_comp) = score_candidate(&early, &dna, &counts, 20, None, false, &weights);
        let (_, late_comp) = score_candidate(&late, &dna, &counts, 20, None, false, &weights);
        assert!(late_comp.adp.abs() > 0.0);
        assert!(early_comp.adp > 0.0);
    }

    #[test]
    fn active_run_adds_panic_term_for_panicky_manager() {
        let mut dna = neutral_dna();
        dna.panic_score = 0.8;
        let weights = neutral_weights();
        let counts = RosterCounts::new();
        let player = candidate(Position::RunningBack, 10.0, 5000.0, 25);

        let (calm, _) = score_candidate(&player, &dna, &counts, 10, None, false, &weights);
        let (run, comp) = score_candidate(
            &player,
            &dna,
            &counts,
            10,
            Some(Position::RunningBack),
            false,
            &weights,
        );
        assert!(run > calm);
        assert!((run - calm - 0.8 * 0.35).abs() < 1e-9);
        assert!(comp.tendency > 0.0);
    }

    #[test]
    fn run_at_other_position_adds_nothing() {
        let mut dna = neutral_dna();
        dna.panic_score = 0.8;
        let weights = neutral_weights();
        let counts = RosterCounts::new();
        let player = candidate(Position::RunningBack, 10.0, 5000.0, 25);

        let (calm, _) = score_candidate(&player, &dna, &counts, 10, None, false, &weights);
        let (other, _) = score_candidate(
            &player,
            &dna,
            &counts,
            10,
            Some(Position::TightEnd),
            false,
            &weights,
        );
        assert!((calm - other).abs() < 1e-12);
    }

    #[test]
    fn reach_modifier_applies_above_half_frequency() {
        let mut dna = neutral_dna();
        let weights = neutral_weights();
        let counts = RosterCounts::new();
        // Ranked well below the slot: a down-board target.
        let player = candidate(Position::WideReceiver, 35.0, 5000.0, 25);

        dna.reach_frequency = 0.4;
        let (without, _) = score_candidate(&player, &dna, &counts, 10, None, false, &weights);
        dna.reach_frequency = 0.7;
        let (with, _) = score_candidate(&player, &dna, &counts, 10, None, false, &weights);
        assert!(with > without);
    }

    #[test]
    fn young_player_gets_rookie_bonus() {
        let mut dna = neutral_dna();
        dna.rookie_appetite = 1.0;
        let weights = neutral_weights();
        let counts = RosterCounts::new();

        let young = candidate(Position::WideReceiver, 10.0, 5000.0, 22);
        let old = candidate(Position::WideReceiver, 10.0, 5000.0, 29);

        let (young_score, young_comp) =
            score_candidate(&young, &dna, &counts, 10, None, false, &weights);
        let (old_score, old_comp) = score_candidate(&old, &dna, &counts, 10, None, false, &weights);
        assert!(young_score > old_score);
        assert!(young_comp.rookie > 0.0);
        assert_eq!(old_comp.rookie, 0.0);
    }

    #[test]
    fn calibration_weights_scale_their_terms() {
        let dna = neutral_dna();
        let counts = RosterCounts::new();
        let player = candidate(Position::RunningBack, 10.0, 5000.0, 25);

        let neutral = neutral_weights();
        let mut boosted = neutral_weights();
        boosted.need = 1.6;

        let (base, base_comp) = score_candidate(&player, &dna, &counts, 10, None, false, &neutral);
        let (high, high_comp) = score_candidate(&player, &dna, &counts, 10, None, false, &boosted);
        assert!(high > base);
        assert!((high_comp.need - base_comp.need * 1.6).abs() < 1e-9);
    }

    #[test]
    fn malformed_candidate_cannot_produce_nan_score() {
        let dna = neutral_dna();
        let weights = neutral_weights();
        let counts = RosterCounts::new();
        // Sanitize is the ingestion guard; scoring still defends itself.
        let player = RankingPoolEntry {
            name: "Broken".into(),
            position: Position::WideReceiver,
            team: None,
            rank: f64::NAN,
            age: None,
            market_value: f64::NAN,
        };
        let (score, components) = score_candidate(&player, &dna, &counts, 10, None, false, &weights);
        assert!(score.is_finite());
        assert!(components.total().is_finite());
    }

    #[test]
    fn shares_sum_to_one() {
        let components = ScoreComponents {
            adp: 0.2,
            need: 0.3,
            tendency: 0.1,
            news: 0.25,
            rookie: 0.05,
        };
        let shares = components.shares();
        let sum = shares.adp + shares.need + shares.tendency + shares.news + shares.rookie;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shares_of_zero_components_are_zero() {
        let shares = ScoreComponents::default().shares();
        assert_eq!(shares, ScoreComponents::default());
    }
}
