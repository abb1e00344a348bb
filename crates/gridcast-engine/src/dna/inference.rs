// Tendency inference from roster composition and performance history.
//
// Total over all inputs: every sub-metric has a hard-coded fallback when
// history is sparse, so inference never fails and never produces NaN.

use std::collections::BTreeMap;

use gridcast_core::history::ManagerHistory;
use gridcast_core::player::{normalize_player_name, Position, RankingPoolEntry};

use super::archetype::{derive_archetype, ArchetypeInputs};
use super::{ManagerDna, PanicResponse, PositionalBias};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Below this many usable samples a sub-metric falls back to its default.
pub const MIN_HISTORY_SAMPLES: usize = 3;

/// Players at or under this age count toward rookie appetite.
pub const ROOKIE_AGE_CUTOFF: u8 = 23;

/// Rank deltas above this count as a reach.
const REACH_DELTA: f64 = 8.0;
/// Rank deltas above this count double.
const BIG_REACH_DELTA: f64 = 20.0;

/// Roster share a balanced build allocates per position.
fn ideal_share(position: Position) -> f64 {
    match position {
        Position::Quarterback => 0.15,
        Position::RunningBack => 0.30,
        Position::WideReceiver => 0.35,
        Position::TightEnd => 0.20,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Infer a full tendency profile for one manager.
///
/// `pool` is the current ranking board; roster players are matched against it
/// by normalized name. `team_count` converts roster slots into implied draft
/// ranks when estimating reaches.
pub fn infer_dna(
    manager: &ManagerHistory,
    pool: &[RankingPoolEntry],
    dynasty: bool,
    team_count: usize,
) -> ManagerDna {
    let matched = match_roster(manager, pool);
    let deltas = reach_deltas(&matched, team_count);

    let win_rate = manager.win_rate();
    let reach_frequency = reach_frequency(&deltas, win_rate, manager.points_ratio());
    let aggression = positional_aggression(manager, &matched, dynasty);
    let rookie_appetite = rookie_appetite(&matched, dynasty, win_rate);
    let stack_tendency = stack_tendency(&matched);
    let panic_score = panic_score(manager, &deltas);
    let panic_response = PanicResponse::from_score(panic_score);

    let archetype = derive_archetype(&ArchetypeInputs {
        reach_frequency,
        rookie_appetite,
        stack_tendency,
        panic_response,
        win_rate,
        dynasty,
    });

    ManagerDna {
        manager: manager.manager_name.clone(),
        roster_id: manager.roster_id,
        reach_frequency,
        aggression,
        rookie_appetite,
        stack_tendency,
        panic_score,
        panic_response,
        archetype,
    }
}

// ---------------------------------------------------------------------------
// Roster matching
// ---------------------------------------------------------------------------

/// A roster player matched to the current board, with the roster slot index
/// it occupies (earliest-acquired first).
struct MatchedPlayer<'a> {
    slot_index: usize,
    entry: &'a RankingPoolEntry,
}

fn match_roster<'a>(
    manager: &ManagerHistory,
    pool: &'a [RankingPoolEntry],
) -> Vec<MatchedPlayer<'a>> {
    manager
        .roster_players
        .iter()
        .enumerate()
        .filter_map(|(slot_index, name)| {
            let wanted = normalize_player_name(name);
            pool.iter()
                .find(|e| normalize_player_name(&e.name) == wanted)
                .map(|entry| MatchedPlayer { slot_index, entry })
        })
        .collect()
}

/// Rank delta per matched player: board rank minus the rank the roster slot
/// implies. Positive means the player sits later on the board than where the
/// manager acquired him (a reach).
fn reach_deltas(matched: &[MatchedPlayer<'_>], team_count: usize) -> Vec<f64> {
    let team_count = team_count.max(1) as f64;
    matched
        .iter()
        .map(|m| {
            let implied = m.slot_index as f64 * team_count + team_count / 2.0;
            m.entry.rank - implied
        })
        .filter(|d| d.is_finite())
        .collect()
}

// ---------------------------------------------------------------------------
// Reach frequency
// ---------------------------------------------------------------------------

fn reach_frequency(deltas: &[f64], win_rate: f64, points_ratio: f64) -> f64 {
    if deltas.len() < MIN_HISTORY_SAMPLES {
        // Sparse history: small base, nudged by record and scoring only.
        let base = 0.22 + (0.5 - win_rate) * 0.24 + (1.0 - points_ratio).clamp(-0.5, 0.5) * 0.1;
        return base.clamp(0.05, 0.6);
    }

    let weighted_reaches: f64 = deltas
        .iter()
        .map(|&d| {
            if d > BIG_REACH_DELTA {
                2.0
            } else if d > REACH_DELTA {
                1.0
            } else {
                0.0
            }
        })
        .sum();

    let fraction = (weighted_reaches / deltas.len() as f64).min(1.0);
    let mut frequency = fraction * 0.85;

    // Losing teams skew aggressive, winning teams skew conservative.
    if win_rate < 0.45 {
        frequency += 0.12;
    } else if win_rate > 0.55 {
        frequency -= 0.08;
    }

    frequency.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Positional aggression
// ---------------------------------------------------------------------------

fn positional_aggression(
    manager: &ManagerHistory,
    matched: &[MatchedPlayer<'_>],
    dynasty: bool,
) -> BTreeMap<Position, PositionalBias> {
    let mut aggression = BTreeMap::new();

    if matched.len() < MIN_HISTORY_SAMPLES {
        for pos in Position::ALL {
            aggression.insert(pos, PositionalBias::neutral());
        }
        return aggression;
    }

    let total = matched.len() as f64;
    let win_rate = manager.win_rate();
    let avg_weekly = manager.average_weekly_points().unwrap_or(100.0);
    let points_ratio = manager.points_ratio();

    for pos in Position::ALL {
        let count = matched.iter().filter(|m| m.entry.position == pos).count() as f64;
        let share = count / total;

        // Position-specific multipliers: RB builds are rewarded by record,
        // WR builds by raw scoring volume, QB builds by scoring ratio, and
        // TE leans heavier in dynasty formats.
        let multiplier = match pos {
            Position::RunningBack => 1.0 + (win_rate - 0.5) * 0.6,
            Position::WideReceiver => (1.0 + (avg_weekly / 115.0 - 1.0) * 0.4).clamp(0.7, 1.4),
            Position::Quarterback => (1.0 + (points_ratio - 1.0) * 0.5).clamp(0.7, 1.4),
            Position::TightEnd => {
                if dynasty {
                    1.25
                } else {
                    1.0
                }
            }
        };

        let base = (share / ideal_share(pos) * 50.0 * multiplier).clamp(0.0, 100.0);
        aggression.insert(
            pos,
            PositionalBias {
                early: base,
                mid: (100.0 - (base - 50.0).abs()).clamp(0.0, 100.0),
                late: (100.0 - base).clamp(0.0, 100.0),
            },
        );
    }

    aggression
}

// ---------------------------------------------------------------------------
// Rookie appetite
// ---------------------------------------------------------------------------

fn rookie_appetite(matched: &[MatchedPlayer<'_>], dynasty: bool, win_rate: f64) -> f64 {
    let aged: Vec<u8> = matched.iter().filter_map(|m| m.entry.age).collect();

    if aged.len() < MIN_HISTORY_SAMPLES {
        let mut base: f64 = 0.3;
        if dynasty {
            base += 0.1;
        }
        if win_rate < 0.45 {
            base += 0.1;
        }
        return base.clamp(0.0, 1.0);
    }

    let young = aged.iter().filter(|&&a| a <= ROOKIE_AGE_CUTOFF).count() as f64;
    let mut appetite = young / aged.len() as f64;

    let avg_age = aged.iter().map(|&a| f64::from(a)).sum::<f64>() / aged.len() as f64;
    if avg_age < 26.0 {
        appetite += 0.15;
    }
    if dynasty {
        appetite += 0.10;
    }
    // Rebuilders lean younger.
    if win_rate < 0.45 {
        appetite += 0.10;
    }

    appetite.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Stack tendency
// ---------------------------------------------------------------------------

/// Pairings per rostered quarterback at which a roster reads as fully
/// stack-driven.
const FULL_STACK_RATE: f64 = 0.6;

fn stack_tendency(matched: &[MatchedPlayer<'_>]) -> f64 {
    let quarterbacks: Vec<&RankingPoolEntry> = matched
        .iter()
        .map(|m| m.entry)
        .filter(|e| e.position == Position::Quarterback && e.team.is_some())
        .collect();

    if quarterbacks.is_empty() || matched.len() < MIN_HISTORY_SAMPLES {
        return 0.25;
    }

    let pairings = quarterbacks
        .iter()
        .map(|qb| {
            matched
                .iter()
                .filter(|m| {
                    m.entry.position.is_pass_catcher()
                        && m.entry.team.is_some()
                        && m.entry.team == qb.team
                })
                .count()
        })
        .sum::<usize>() as f64;

    (pairings / (quarterbacks.len() as f64 * FULL_STACK_RATE)).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Panic score
// ---------------------------------------------------------------------------

fn panic_score(manager: &ManagerHistory, deltas: &[f64]) -> f64 {
    let scores: Vec<f64> = manager
        .weekly_scores
        .iter()
        .map(|w| w.points)
        .filter(|p| p.is_finite())
        .collect();

    if scores.len() < MIN_HISTORY_SAMPLES {
        return 0.25;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    if mean <= 0.0 {
        return 0.25;
    }

    // A panic event is a big single-week drop followed by an over-correction
    // the next week.
    let mut events = 0usize;
    let mut opportunities = 0usize;
    for window in scores.windows(2) {
        opportunities += 1;
        let dropped = window[0] < mean * 0.75;
        let rebounded = window[1] > mean;
        if dropped && rebounded {
            events += 1;
        }
    }
    let event_rate = if opportunities == 0 {
        0.0
    } else {
        events as f64 / opportunities as f64
    };

    // Reach-delta variance, normalized against a one-round spread.
    let variance_norm = if deltas.len() < MIN_HISTORY_SAMPLES {
        0.0
    } else {
        let delta_mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
        let variance = deltas
            .iter()
            .map(|d| (d - delta_mean).powi(2))
            .sum::<f64>()
            / deltas.len() as f64;
        (variance / (BIG_REACH_DELTA * BIG_REACH_DELTA)).clamp(0.0, 1.0)
    };

    (0.6 * event_rate + 0.4 * variance_norm).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
