// Trial execution: independent playthroughs of a full snake draft.
//
// Every trial owns a private copy of the pool and per-manager roster
// counters, so trials never share mutable state.

use rand::Rng;
use tracing::warn;

use gridcast_core::player::{normalize_player_name, Position, RankingPoolEntry};
use gridcast_core::weights::CalibrationWeights;

use super::aggregate::OutcomeAggregator;
use super::order::manager_for_overall;
use super::scoring::{
    detect_position_run, score_candidate, RosterCounts, MIN_SAMPLING_WEIGHT, RUN_WINDOW,
};
use super::SimulationRequest;
use crate::dna::ManagerDna;

/// How many top-ranked players of the forced position a forced-run pick
/// chooses among.
const FORCED_RUN_CHOICES: usize = 3;

/// Run `req.trials` independent trials, feeding every pick at a tracked slot
/// into `aggregator`.
///
/// `pool` must be the full board; each trial deep-copies it. `dnas` holds one
/// profile per draft slot, in slot order.
pub fn run_trials<R: Rng>(
    pool: &[RankingPoolEntry],
    dnas: &[ManagerDna],
    req: &SimulationRequest,
    weights: &CalibrationWeights,
    aggregator: &mut OutcomeAggregator,
    rng: &mut R,
) {
    if dnas.is_empty() {
        warn!("simulation requested with no manager profiles; nothing to run");
        return;
    }

    let mut base_pool: Vec<RankingPoolEntry> =
        pool.iter().cloned().map(RankingPoolEntry::sanitize).collect();
    base_pool.sort_by(|a, b| a.rank.partial_cmp(&b.rank).unwrap_or(std::cmp::Ordering::Equal));

    // Scenario: a removed player is excluded before any trial starts.
    if let Some(scenario) = &req.scenario {
        if let Some(removed) = &scenario.removed_player {
            let wanted = normalize_player_name(removed);
            base_pool.retain(|e| normalize_player_name(&e.name) != wanted);
        }
    }

    for _ in 0..req.trials {
        run_single_trial(&base_pool, dnas, req, weights, aggregator, rng);
    }
}

fn run_single_trial<R: Rng>(
    base_pool: &[RankingPoolEntry],
    dnas: &[ManagerDna],
    req: &SimulationRequest,
    weights: &CalibrationWeights,
    aggregator: &mut OutcomeAggregator,
    rng: &mut R,
) {
    let mut pool = base_pool.to_vec();
    let mut counts: Vec<RosterCounts> = vec![RosterCounts::new(); req.team_count];
    let mut recent: Vec<Position> = Vec::with_capacity(RUN_WINDOW + 1);

    for overall in 1..=req.total_picks() {
        if pool.is_empty() {
            break;
        }

        let manager_index = manager_for_overall(req.team_count, overall);
        let dna = &dnas[manager_index % dnas.len()];
        let manager_counts = &counts[manager_index % counts.len()];
        let active_run = detect_position_run(&recent);

        let chosen_index = select_pick_index(
            &pool,
            dna,
            manager_counts,
            overall,
            active_run,
            req,
            weights,
            rng,
        );

        let chosen = pool.remove(chosen_index);
        let (_, components) = score_candidate(
            &chosen,
            dna,
            manager_counts,
            overall,
            active_run,
            req.superflex,
            weights,
        );

        aggregator.record(overall, &chosen, &components);

        counts[manager_index % req.team_count].record(chosen.position);
        recent.push(chosen.position);
        if recent.len() > RUN_WINDOW {
            recent.remove(0);
        }
    }
}

/// Choose the pool index to draft at this pick.
#[allow(clippy::too_many_arguments)]
fn select_pick_index<R: Rng>(
    pool: &[RankingPoolEntry],
    dna: &ManagerDna,
    counts: &RosterCounts,
    overall: u32,
    active_run: Option<Position>,
    req: &SimulationRequest,
    weights: &CalibrationWeights,
    rng: &mut R,
) -> usize {
    // Forced positional run: inside the window, draft only from the top
    // remaining players at the forced position.
    if let Some(forced) = req.scenario.as_ref().and_then(|s| s.forced_run.as_ref()) {
        let window_start = forced.before_overall.saturating_sub((req.team_count / 2) as u32);
        if overall >= window_start && overall < forced.before_overall {
            let candidates: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, e)| e.position == forced.position)
                .map(|(i, _)| i)
                .take(FORCED_RUN_CHOICES)
                .collect();
            if !candidates.is_empty() {
                return candidates[rng.gen_range(0..candidates.len())];
            }
            // No players left at the forced position; fall through to the
            // general scoring path.
        }
    }

    let candidate_count = req.candidate_pool.min(pool.len());
    if candidate_count == 0 {
        // Pool exhausted mid-pick: degrade to the best-ranked remaining
        // player. Should never happen with a sane pool size.
        warn!("candidate slice empty at pick {}; taking best remaining", overall);
        return 0;
    }

    let sampling_weights: Vec<f64> = pool[..candidate_count]
        .iter()
        .map(|candidate| {
            let (score, _) = score_candidate(
                candidate,
                dna,
                counts,
                overall,
                active_run,
                req.superflex,
                weights,
            );
            score.max(MIN_SAMPLING_WEIGHT)
        })
        .collect();

    weighted_draw(&sampling_weights, rng)
}

/// Single uniform draw against cumulative weights.
fn weighted_draw<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    let mut remaining = rng.gen::<f64>() * total;
    for (index, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return index;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::super::{ForcedRun, Scenario};
    use super::*;
    use crate::dna::infer_dna;
    use gridcast_core::history::ManagerHistory;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn test_pool(size: usize) -> Vec<RankingPoolEntry> {
        (0..size)
            .map(|i| {
                let position = match i % 4 {
                    0 => Position::RunningBack,
                    1 => Position::WideReceiver,
                    2 => Position::TightEnd,
                    _ => Position::Quarterback,
                };
                RankingPoolEntry {
                    name: format!("Player {:03}", i + 1),
                    position,
                    team: None,
                    rank: (i + 1) as f64,
                    age: Some(22 + (i % 10) as u8),
                    market_value: 9000.0 - (i as f64 * 25.0),
                }
            })
            .collect()
    }

    fn test_dnas(count: usize) -> Vec<ManagerDna> {
        (0..count)
            .map(|i| {
                let manager = ManagerHistory {
                    manager_name: format!("Manager {}", i + 1),
                    roster_id: i as u32 + 1,
                    wins: 7,
                    losses: 7,
                    points_for: 1400.0,
                    points_against: 1400.0,
                    weekly_scores: vec![],
                    roster_players: vec![],
                };
                infer_dna(&manager, &[], false, count)
            })
            .collect()
    }

    fn request(trials: usize, scenario: Option<Scenario>) -> SimulationRequest {
        SimulationRequest {
            team_count: 12,
            rounds: 3,
            user_slot: 6,
            trials,
            superflex: false,
            candidate_pool: 40,
            shortlist_size: 3,
            scenario,
        }
    }

    #[test]
    fn weighted_draw_respects_weights() {
        let weights = vec![0.0, 0.0, 10.0, 0.0];
        let mut rng = test_rng(1);
        for _ in 0..50 {
            assert_eq!(weighted_draw(&weights, &mut rng), 2);
        }
    }

    #[test]
    fn weighted_draw_degenerate_total_picks_first() {
        let mut rng = test_rng(1);
        assert_eq!(weighted_draw(&[0.0, 0.0], &mut rng), 0);
        assert_eq!(weighted_draw(&[f64::NAN, 1.0], &mut rng), 0);
    }

    #[test]
    fn every_trial_drafts_every_slot() {
        let pool = test_pool(60);
        let dnas = test_dnas(12);
        let req = request(20, None);
        let mut aggregator = OutcomeAggregator::new(&[1, 18, 36]);
        let mut rng = test_rng(7);

        run_trials(&pool, &dnas, &req, &CalibrationWeights::neutral("1", "2025"), &mut aggregator, &mut rng);

        let forecasts = aggregator.finish(20, 12, 3, &vec!["M".to_string(); 12]);
        for forecast in &forecasts {
            let total_hits: usize = forecast
                .top_targets
                .iter()
                .map(|t| t.probability as usize)
                .sum();
            assert!(total_hits > 0, "slot {} never drafted", forecast.overall);
        }
    }

    #[test]
    fn trials_do_not_share_pool_state() {
        // With trials sharing a pool the second trial would exhaust it;
        // 20 trials over a 60-player pool only works with per-trial copies.
        let pool = test_pool(60);
        let dnas = test_dnas(12);
        let req = request(20, None);
        let mut aggregator = OutcomeAggregator::new(&[36]);
        let mut rng = test_rng(3);

        run_trials(&pool, &dnas, &req, &CalibrationWeights::neutral("1", "2025"), &mut aggregator, &mut rng);

        let forecasts = aggregator.finish(20, 12, 3, &vec!["M".to_string(); 12]);
        let hits: u32 = forecasts[0].top_targets.iter().map(|t| u32::from(t.probability)).sum();
        assert!(hits > 0);
    }

    #[test]
    fn removed_player_never_drafted() {
        let pool = test_pool(60);
        let dnas = test_dnas(12);
        let scenario = Scenario {
            removed_player: Some("Player 001".into()),
            forced_run: None,
        };
        let req = request(50, Some(scenario));
        let slots: Vec<u32> = (1..=36).collect();
        let mut aggregator = OutcomeAggregator::new(&slots);
        let mut rng = test_rng(11);

        run_trials(&pool, &dnas, &req, &CalibrationWeights::neutral("1", "2025"), &mut aggregator, &mut rng);

        let forecasts = aggregator.finish(50, 12, 60, &vec!["M".to_string(); 12]);
        for forecast in forecasts {
            for target in forecast.top_targets {
                assert_ne!(target.player, "Player 001");
            }
        }
    }

    #[test]
    fn forced_run_floods_position_before_target_pick() {
        let pool = test_pool(60);
        let dnas = test_dnas(12);
        let scenario = Scenario {
            removed_player: None,
            forced_run: Some(ForcedRun {
                position: Position::TightEnd,
                before_overall: 6,
            }),
        };
        let req = request(30, Some(scenario));
        // With 12 teams the forced window covers picks 1 through 5.
        let mut aggregator = OutcomeAggregator::new(&[1, 2, 3, 4, 5]);
        let mut rng = test_rng(13);

        run_trials(&pool, &dnas, &req, &CalibrationWeights::neutral("1", "2025"), &mut aggregator, &mut rng);

        let forecasts = aggregator.finish(30, 12, 3, &vec!["M".to_string(); 12]);
        for forecast in &forecasts {
            for target in &forecast.top_targets {
                assert_eq!(
                    target.position,
                    Position::TightEnd,
                    "pick {} drafted {} instead of a tight end",
                    forecast.overall,
                    target.player
                );
            }
        }
    }

    #[test]
    fn tiny_pool_degrades_without_panicking() {
        // 12 teams x 3 rounds needs 36 picks but only 10 players exist; the
        // trial must stop cleanly when the pool runs dry.
        let pool = test_pool(10);
        let dnas = test_dnas(12);
        let req = request(5, None);
        let mut aggregator = OutcomeAggregator::new(&[1, 10, 36]);
        let mut rng = test_rng(17);

        run_trials(&pool, &dnas, &req, &CalibrationWeights::neutral("1", "2025"), &mut aggregator, &mut rng);

        let forecasts = aggregator.finish(5, 12, 3, &vec!["M".to_string(); 12]);
        // Slot 36 is beyond the pool; it must simply have no targets.
        let last = forecasts.iter().find(|f| f.overall == 36).unwrap();
        assert!(last.top_targets.is_empty());
        // Slot 10 is within the 10 available players.
        let tenth = forecasts.iter().find(|f| f.overall == 10).unwrap();
        assert!(!tenth.top_targets.is_empty());
    }

    #[test]
    fn same_seed_reproduces_identical_outcome() {
        let pool = test_pool(60);
        let dnas = test_dnas(12);
        let req = request(25, None);
        let weights = CalibrationWeights::neutral("1", "2025");

        let run = |seed: u64| {
            let mut aggregator = OutcomeAggregator::new(&[6, 18, 30]);
            let mut rng = test_rng(seed);
            run_trials(&pool, &dnas, &req, &weights, &mut aggregator, &mut rng);
            aggregator.finish(25, 12, 3, &vec!["M".to_string(); 12])
        };

        let first = run(99);
        let second = run(99);
        for (a, b) in first.iter().zip(second.iter()) {
            let names_a: Vec<_> = a.top_targets.iter().map(|t| (&t.player, t.probability)).collect();
            let names_b: Vec<_> = b.top_targets.iter().map(|t| (&t.player, t.probability)).collect();
            assert_eq!(names_a, names_b);
        }
    }
}
