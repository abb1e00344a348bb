// Drift computation: diff the current week's snapshot against the prior
// week's and project the movement onto the target manager's next picks.

use std::collections::HashMap;

use gridcast_core::player::{normalize_player_name, RankingAdjustment};

use super::{
    ArchetypeShift, BoardDriftReport, BoardDriftSnapshot, DnaShift, DriftDirection, DriftSeverity,
    PickWindowOutlook, PlayerDrift,
};
use crate::sim::order::{overall_picks_for_slot, round_and_pick};

/// Movements smaller than this are stable and excluded from output.
const STABLE_EPSILON: f64 = 0.5;

/// Manager signals that moved by at least this much get reported.
const DNA_SHIFT_THRESHOLD: f64 = 0.05;

/// How many of the target manager's upcoming picks get an outlook.
const OUTLOOK_PICKS: usize = 3;

/// How many risers/fallers the report lists.
const TOP_MOVERS: usize = 5;

/// Compute the weekly drift report.
///
/// `previous` is the prior ISO week's snapshot; `None` means this is the
/// first run ever for the league, which yields the baseline result rather
/// than an error.
pub fn compute_drift_report(
    previous: Option<&BoardDriftSnapshot>,
    current: &BoardDriftSnapshot,
    adjustments: &[RankingAdjustment],
    user_slot: usize,
    team_count: usize,
) -> BoardDriftReport {
    let Some(previous) = previous else {
        return BoardDriftReport {
            league_id: current.league_id.clone(),
            week_key: current.week_key.clone(),
            baseline: true,
            headline: format!(
                "No prior week on file for {}; baseline established",
                current.week_key
            ),
            top_risers: Vec::new(),
            top_fallers: Vec::new(),
            dna_shifts: Vec::new(),
            archetype_shifts: Vec::new(),
            pick_outlook: Vec::new(),
        };
    };

    let drifts = player_drifts(previous, current, adjustments);

    let mut risers: Vec<PlayerDrift> = drifts
        .iter()
        .filter(|d| d.direction == DriftDirection::Rising)
        .cloned()
        .collect();
    risers.sort_by(|a, b| a.drift.partial_cmp(&b.drift).unwrap_or(std::cmp::Ordering::Equal));
    risers.truncate(TOP_MOVERS);

    let mut fallers: Vec<PlayerDrift> = drifts
        .iter()
        .filter(|d| d.direction == DriftDirection::Falling)
        .cloned()
        .collect();
    fallers.sort_by(|a, b| b.drift.partial_cmp(&a.drift).unwrap_or(std::cmp::Ordering::Equal));
    fallers.truncate(TOP_MOVERS);

    let (dna_shifts, archetype_shifts) = dna_shifts(previous, current);
    let pick_outlook = pick_outlook(previous, current, &drifts, user_slot, team_count);
    let headline = headline(&risers, &fallers);

    BoardDriftReport {
        league_id: current.league_id.clone(),
        week_key: current.week_key.clone(),
        baseline: false,
        headline,
        top_risers: risers,
        top_fallers: fallers,
        dna_shifts,
        archetype_shifts,
        pick_outlook,
    }
}

// ---------------------------------------------------------------------------
// Player drift
// ---------------------------------------------------------------------------

fn player_drifts(
    previous: &BoardDriftSnapshot,
    current: &BoardDriftSnapshot,
    adjustments: &[RankingAdjustment],
) -> Vec<PlayerDrift> {
    let previous_ranks: HashMap<String, f64> = previous
        .entries
        .iter()
        .map(|e| (normalize_player_name(&e.name), e.rank))
        .collect();

    let adjustment_reasons: HashMap<String, String> = adjustments
        .iter()
        .filter(|a| !a.reasons.is_empty())
        .map(|a| (normalize_player_name(&a.name), a.reasons.join("; ")))
        .collect();

    let mut drifts = Vec::new();
    for entry in &current.entries {
        let key = normalize_player_name(&entry.name);
        let Some(&previous_rank) = previous_ranks.get(&key) else {
            continue;
        };
        let drift = entry.rank - previous_rank;
        if !drift.is_finite() || drift.abs() < STABLE_EPSILON {
            continue;
        }

        let severity = DriftSeverity::from_magnitude(drift.abs());
        let direction = if drift < 0.0 {
            DriftDirection::Rising
        } else {
            DriftDirection::Falling
        };

        // News-driven reasons from the provider are authoritative; otherwise
        // synthesize one from the movement itself.
        let reason = adjustment_reasons
            .get(&key)
            .cloned()
            .unwrap_or_else(|| synthesized_reason(severity, direction));

        drifts.push(PlayerDrift {
            name: entry.name.clone(),
            position: entry.position,
            previous_rank,
            current_rank: entry.rank,
            drift,
            severity,
            direction,
            reason,
        });
    }
    drifts
}

fn synthesized_reason(severity: DriftSeverity, direction: DriftDirection) -> String {
    match (severity, direction) {
        (DriftSeverity::Major, DriftDirection::Rising) => {
            "Sharp market surge this week".to_string()
        }
        (DriftSeverity::Major, DriftDirection::Falling) => {
            "Sharp market fade this week".to_string()
        }
        (DriftSeverity::Moderate, DriftDirection::Rising) => {
            "Steady climb in consensus".to_string()
        }
        (DriftSeverity::Moderate, DriftDirection::Falling) => {
            "Slipping in consensus".to_string()
        }
        (DriftSeverity::Minor, _) => "Small week-over-week adjustment".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Manager signal drift
// ---------------------------------------------------------------------------

fn dna_shifts(
    previous: &BoardDriftSnapshot,
    current: &BoardDriftSnapshot,
) -> (Vec<DnaShift>, Vec<ArchetypeShift>) {
    let previous_by_manager: HashMap<&str, &crate::dna::ManagerDna> = previous
        .manager_dna
        .iter()
        .map(|d| (d.manager.as_str(), d))
        .collect();

    let mut shifts = Vec::new();
    let mut archetype_shifts = Vec::new();

    for dna in &current.manager_dna {
        let Some(prior) = previous_by_manager.get(dna.manager.as_str()) else {
            continue;
        };

        let signals: [(&str, f64, f64); 4] = [
            ("reach_frequency", prior.reach_frequency, dna.reach_frequency),
            ("rookie_appetite", prior.rookie_appetite, dna.rookie_appetite),
            ("stack_tendency", prior.stack_tendency, dna.stack_tendency),
            ("panic_score", prior.panic_score, dna.panic_score),
        ];
        for (signal, previous_value, current_value) in signals {
            if (current_value - previous_value).abs() >= DNA_SHIFT_THRESHOLD {
                shifts.push(DnaShift {
                    manager: dna.manager.clone(),
                    signal: signal.to_string(),
                    previous: previous_value,
                    current: current_value,
                });
            }
        }

        if prior.archetype != dna.archetype {
            archetype_shifts.push(ArchetypeShift {
                manager: dna.manager.clone(),
                previous: prior.archetype,
                current: dna.archetype,
            });
        }
    }

    (shifts, archetype_shifts)
}

// ---------------------------------------------------------------------------
// Pick-window projection
// ---------------------------------------------------------------------------

fn pick_outlook(
    previous: &BoardDriftSnapshot,
    current: &BoardDriftSnapshot,
    drifts: &[PlayerDrift],
    user_slot: usize,
    team_count: usize,
) -> Vec<PickWindowOutlook> {
    let previous_ranks: HashMap<String, f64> = previous
        .entries
        .iter()
        .map(|e| (normalize_player_name(&e.name), e.rank))
        .collect();

    let window_radius = team_count as f64 * 0.4;

    overall_picks_for_slot(team_count, OUTLOOK_PICKS, user_slot)
        .into_iter()
        .map(|overall| {
            let center = f64::from(overall);
            let window_low = (center - window_radius).max(1.0);
            let window_high = center + window_radius;
            let in_window = |rank: f64| rank >= window_low && rank <= window_high;

            let risers = drifts
                .iter()
                .filter(|d| d.direction == DriftDirection::Rising && in_window(d.current_rank))
                .map(|d| d.name.clone())
                .collect();
            let fallers = drifts
                .iter()
                .filter(|d| d.direction == DriftDirection::Falling && in_window(d.current_rank))
                .map(|d| d.name.clone())
                .collect();

            // New entrants: in the window now, but either absent last week or
            // ranked outside the window then.
            let new_entrants = current
                .entries
                .iter()
                .filter(|e| in_window(e.rank))
                .filter(|e| {
                    match previous_ranks.get(&normalize_player_name(&e.name)) {
                        None => true,
                        Some(&prev_rank) => !in_window(prev_rank),
                    }
                })
                .map(|e| e.name.clone())
                .collect();

            let (round, pick) = round_and_pick(team_count, overall);
            PickWindowOutlook {
                overall,
                round,
                pick,
                window_low,
                window_high,
                risers,
                fallers,
                new_entrants,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Headline
// ---------------------------------------------------------------------------

fn headline(risers: &[PlayerDrift], fallers: &[PlayerDrift]) -> String {
    let top_riser = risers.first();
    let top_faller = fallers.first();

    match (top_riser, top_faller) {
        (None, None) => "Quiet week on the board".to_string(),
        (Some(riser), None) => format!(
            "Biggest riser: {} climbed {:.0} spots",
            riser.name,
            riser.drift.abs()
        ),
        (None, Some(faller)) => format!(
            "Biggest faller: {} dropped {:.0} spots",
            faller.name,
            faller.drift.abs()
        ),
        (Some(riser), Some(faller)) => {
            if riser.drift.abs() >= faller.drift.abs() {
                format!(
                    "Biggest riser: {} climbed {:.0} spots",
                    riser.name,
                    riser.drift.abs()
                )
            } else {
                format!(
                    "Biggest faller: {} dropped {:.0} spots",
                    faller.name,
                    faller.drift.abs()
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gridcast_core::history::ManagerHistory;
    use gridcast_core::player::{Position, RankingPoolEntry};

    use crate::dna::infer_dna;

    fn entry(name: &str, pos: Position, rank: f64) -> RankingPoolEntry {
        RankingPoolEntry {
            name: name.into(),
            position: pos,
            team: None,
            rank,
            age: Some(25),
            market_value: 5000.0,
        }
    }

    fn snapshot(week_key: &str, entries: Vec<RankingPoolEntry>) -> BoardDriftSnapshot {
        BoardDriftSnapshot {
            league_id: "42".into(),
            week_key: week_key.into(),
            entries,
            manager_dna: vec![],
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn first_run_returns_baseline() {
        let current = snapshot("2026-W32", vec![entry("A", Position::RunningBack, 1.0)]);
        let report = compute_drift_report(None, &current, &[], 6, 12);
        assert!(report.baseline);
        assert!(report.top_risers.is_empty());
        assert!(report.top_fallers.is_empty());
        assert!(report.headline.contains("baseline established"));
    }

    #[test]
    fn stable_players_are_excluded() {
        let previous = snapshot("2026-W31", vec![entry("Stable", Position::RunningBack, 10.0)]);
        let current = snapshot("2026-W32", vec![entry("Stable", Position::RunningBack, 10.3)]);
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        assert!(report.top_risers.is_empty());
        assert!(report.top_fallers.is_empty());
        assert_eq!(report.headline, "Quiet week on the board");
    }

    #[test]
    fn riser_and_faller_classified() {
        let previous = snapshot(
            "2026-W31",
            vec![
                entry("Riser", Position::WideReceiver, 20.0),
                entry("Faller", Position::RunningBack, 10.0),
            ],
        );
        let current = snapshot(
            "2026-W32",
            vec![
                entry("Riser", Position::WideReceiver, 11.0),
                entry("Faller", Position::RunningBack, 16.0),
            ],
        );
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);

        assert_eq!(report.top_risers.len(), 1);
        let riser = &report.top_risers[0];
        assert_eq!(riser.name, "Riser");
        assert_eq!(riser.drift, -9.0);
        assert_eq!(riser.severity, DriftSeverity::Major);

        assert_eq!(report.top_fallers.len(), 1);
        let faller = &report.top_fallers[0];
        assert_eq!(faller.name, "Faller");
        assert_eq!(faller.drift, 6.0);
        assert_eq!(faller.severity, DriftSeverity::Moderate);
    }

    #[test]
    fn provider_reasons_are_authoritative() {
        let previous = snapshot("2026-W31", vec![entry("Newsy", Position::RunningBack, 20.0)]);
        let current = snapshot("2026-W32", vec![entry("Newsy", Position::RunningBack, 10.0)]);
        let adjustments = vec![RankingAdjustment {
            name: "Newsy".into(),
            delta: -10.0,
            reasons: vec!["Starter role confirmed".into()],
        }];
        let report = compute_drift_report(Some(&previous), &current, &adjustments, 6, 12);
        assert_eq!(report.top_risers[0].reason, "Starter role confirmed");
    }

    #[test]
    fn synthesized_reason_buckets_by_magnitude() {
        let previous = snapshot(
            "2026-W31",
            vec![
                entry("Big Move", Position::RunningBack, 30.0),
                entry("Mid Move", Position::WideReceiver, 30.0),
                entry("Small Move", Position::TightEnd, 30.0),
            ],
        );
        let current = snapshot(
            "2026-W32",
            vec![
                entry("Big Move", Position::RunningBack, 18.0),
                entry("Mid Move", Position::WideReceiver, 25.0),
                entry("Small Move", Position::TightEnd, 29.0),
            ],
        );
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        let by_name: std::collections::HashMap<&str, &PlayerDrift> = report
            .top_risers
            .iter()
            .map(|d| (d.name.as_str(), d))
            .collect();
        assert_eq!(by_name["Big Move"].reason, "Sharp market surge this week");
        assert_eq!(by_name["Mid Move"].reason, "Steady climb in consensus");
        assert_eq!(by_name["Small Move"].reason, "Small week-over-week adjustment");
    }

    #[test]
    fn headline_names_biggest_mover() {
        let previous = snapshot(
            "2026-W31",
            vec![
                entry("Up A Lot", Position::RunningBack, 30.0),
                entry("Down A Bit", Position::WideReceiver, 10.0),
            ],
        );
        let current = snapshot(
            "2026-W32",
            vec![
                entry("Up A Lot", Position::RunningBack, 15.0),
                entry("Down A Bit", Position::WideReceiver, 15.0),
            ],
        );
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        assert!(report.headline.contains("Up A Lot"), "got: {}", report.headline);
        assert!(report.headline.contains("15 spots"));
    }

    #[test]
    fn dna_shift_reported_at_threshold() {
        let manager = ManagerHistory {
            manager_name: "Shifty".into(),
            roster_id: 1,
            wins: 7,
            losses: 7,
            points_for: 1400.0,
            points_against: 1400.0,
            weekly_scores: vec![],
            roster_players: vec![],
        };
        let mut prior_dna = infer_dna(&manager, &[], false, 12);
        let mut current_dna = prior_dna.clone();
        prior_dna.reach_frequency = 0.30;
        current_dna.reach_frequency = 0.40;

        let mut previous = snapshot("2026-W31", vec![]);
        previous.manager_dna = vec![prior_dna];
        let mut current = snapshot("2026-W32", vec![]);
        current.manager_dna = vec![current_dna];

        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        assert_eq!(report.dna_shifts.len(), 1);
        assert_eq!(report.dna_shifts[0].signal, "reach_frequency");
        assert_eq!(report.dna_shifts[0].manager, "Shifty");
    }

    #[test]
    fn sub_threshold_dna_change_not_reported() {
        let manager = ManagerHistory {
            manager_name: "Steady".into(),
            roster_id: 1,
            wins: 7,
            losses: 7,
            points_for: 1400.0,
            points_against: 1400.0,
            weekly_scores: vec![],
            roster_players: vec![],
        };
        let mut prior_dna = infer_dna(&manager, &[], false, 12);
        let mut current_dna = prior_dna.clone();
        prior_dna.rookie_appetite = 0.30;
        current_dna.rookie_appetite = 0.33;

        let mut previous = snapshot("2026-W31", vec![]);
        previous.manager_dna = vec![prior_dna];
        let mut current = snapshot("2026-W32", vec![]);
        current.manager_dna = vec![current_dna];

        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        assert!(report.dna_shifts.is_empty());
    }

    #[test]
    fn pick_outlook_covers_next_three_picks() {
        let previous = snapshot("2026-W31", vec![]);
        let current = snapshot("2026-W32", vec![]);
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        let overalls: Vec<u32> = report.pick_outlook.iter().map(|o| o.overall).collect();
        assert_eq!(overalls, vec![6, 18, 30]);
    }

    #[test]
    fn window_movers_attach_to_relevant_pick() {
        // Slot 6 of 12: windows are 6 +/- 4.8, 18 +/- 4.8, 30 +/- 4.8.
        let previous = snapshot(
            "2026-W31",
            vec![
                entry("Near First Pick", Position::RunningBack, 12.0),
                entry("Far From Picks", Position::WideReceiver, 60.0),
            ],
        );
        let current = snapshot(
            "2026-W32",
            vec![
                entry("Near First Pick", Position::RunningBack, 7.0),
                entry("Far From Picks", Position::WideReceiver, 54.0),
            ],
        );
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);

        let first = &report.pick_outlook[0];
        assert_eq!(first.risers, vec!["Near First Pick".to_string()]);
        // The far player moved but lands in no window.
        for outlook in &report.pick_outlook {
            assert!(!outlook.risers.contains(&"Far From Picks".to_string()));
            assert!(!outlook.fallers.contains(&"Far From Picks".to_string()));
        }
    }

    #[test]
    fn new_entrant_detected_in_window() {
        let previous = snapshot(
            "2026-W31",
            vec![entry("Old Timer", Position::RunningBack, 6.0)],
        );
        let current = snapshot(
            "2026-W32",
            vec![
                entry("Old Timer", Position::RunningBack, 6.0),
                entry("Fresh Face", Position::WideReceiver, 5.0),
            ],
        );
        let report = compute_drift_report(Some(&previous), &current, &[], 6, 12);
        let first = &report.pick_outlook[0];
        assert!(first.new_entrants.contains(&"Fresh Face".to_string()));
        assert!(!first.new_entrants.contains(&"Old Timer".to_string()));
    }
}
