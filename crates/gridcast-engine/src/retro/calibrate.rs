// Draft evaluation and weight recalibration.
//
// Compares a stored prediction snapshot against the real draft, scores
// per-manager accuracy, explains the confident misses through an ordered rule
// cascade, and nudges the persisted scoring weights toward better calibration
// through a clamped exponential moving average.

use std::collections::HashMap;

use gridcast_core::config::CalibrationConfig;
use gridcast_core::draft::DraftResult;
use gridcast_core::player::{normalize_player_name, Position};
use gridcast_core::weights::CalibrationWeights;

use super::{CallRecord, ManagerAccuracy, MissExplanation, MissReason};
use crate::forecast::PredictionSnapshot;
use crate::sim::scoring::ScoreComponents;

/// Misses whose top prediction carried at least this probability get an
/// explanation.
const CONFIDENT_MISS_THRESHOLD: u8 = 15;

/// Even 1-in-5 share each component would carry in a flat model.
const EVEN_SHARE: f64 = 0.2;

// ---------------------------------------------------------------------------
// Miss classification
// ---------------------------------------------------------------------------

/// Inputs to the miss-reason cascade.
#[derive(Debug, Clone, Copy)]
pub struct MissContext {
    pub predicted_position: Position,
    pub actual_position: Position,
    /// Component shares of the predicted top target's score.
    pub shares: ScoreComponents,
    /// Where the actual pick sat on the shortlist, if it was there at all.
    pub actual_shortlist_index: Option<usize>,
}

type MissRule = (&'static str, fn(&MissContext) -> bool, MissReason);

/// Ordered cascade; first match wins.
const MISS_RULES: &[MissRule] = &[
    (
        "actual pick came from another position",
        |c| c.predicted_position != c.actual_position,
        MissReason::PositionSurprise,
    ),
    (
        "manager-bias terms dominated the score",
        |c| c.shares.tendency > 0.35,
        MissReason::TendencyOverweighted,
    ),
    (
        "rank-consensus terms dominated the score",
        |c| c.shares.adp > 0.45,
        MissReason::AdpDriven,
    ),
    (
        "news-sensitive terms carried outsized weight",
        |c| c.shares.news > 0.15,
        MissReason::NewsDriven,
    ),
    (
        "actual pick was shortlisted below the top slot",
        |c| matches!(c.actual_shortlist_index, Some(i) if i > 0),
        MissReason::CloseCall,
    ),
];

/// Classify a confident miss.
pub fn classify_miss(context: &MissContext) -> MissReason {
    MISS_RULES
        .iter()
        .find(|(_, predicate, _)| predicate(context))
        .map(|(_, _, reason)| *reason)
        .unwrap_or(MissReason::Unpredicted)
}

// ---------------------------------------------------------------------------
// Draft evaluation
// ---------------------------------------------------------------------------

/// One miss's contribution to the weight update.
#[derive(Debug, Clone, Copy)]
pub struct WeightObservation {
    /// `1 - assigned_probability/100` for the actual pick.
    pub error: f64,
    /// Component shares of the predicted top target's score.
    pub shares: ScoreComponents,
}

/// Everything the retrospective extracts from one prediction/draft pair.
#[derive(Debug, Clone)]
pub struct DraftEvaluation {
    pub picks_evaluated: u32,
    pub exact_hits: u32,
    pub top3_hits: u32,
    pub managers: Vec<ManagerAccuracy>,
    pub misses: Vec<MissExplanation>,
    pub observations: Vec<WeightObservation>,
}

struct ManagerTally {
    picks_evaluated: u32,
    exact_hits: u32,
    top3_hits: u32,
    probability_sum: f64,
    best_call: Option<CallRecord>,
    worst_miss: Option<CallRecord>,
}

/// Walk the real draft pick by pick and score it against the snapshot.
///
/// Picks at slots the snapshot never forecast (or forecast with an empty
/// shortlist) are skipped rather than counted against the model.
pub fn evaluate_draft(snapshot: &PredictionSnapshot, result: &DraftResult) -> DraftEvaluation {
    let mut tallies: HashMap<String, ManagerTally> = HashMap::new();
    let mut manager_order: Vec<String> = Vec::new();
    let mut misses = Vec::new();
    let mut observations = Vec::new();

    for actual in &result.picks {
        let Some(forecast) = snapshot.pick_at(actual.overall) else {
            continue;
        };
        let Some(top) = forecast.top_targets.first() else {
            continue;
        };

        let actual_key = normalize_player_name(&actual.player_name);
        let shortlist_index = forecast
            .top_targets
            .iter()
            .position(|t| normalize_player_name(&t.player) == actual_key);
        let exact = shortlist_index == Some(0);
        let assigned_probability = shortlist_index
            .map(|i| f64::from(forecast.top_targets[i].probability))
            .unwrap_or(0.0);

        if !tallies.contains_key(&actual.manager) {
            manager_order.push(actual.manager.clone());
        }
        let tally = tallies.entry(actual.manager.clone()).or_insert(ManagerTally {
            picks_evaluated: 0,
            exact_hits: 0,
            top3_hits: 0,
            probability_sum: 0.0,
            best_call: None,
            worst_miss: None,
        });

        tally.picks_evaluated += 1;
        tally.probability_sum += assigned_probability;
        if exact {
            tally.exact_hits += 1;
            let record = CallRecord {
                overall: actual.overall,
                player: top.player.clone(),
                probability: top.probability,
            };
            if tally.best_call.as_ref().map_or(true, |b| record.probability > b.probability) {
                tally.best_call = Some(record);
            }
        } else {
            if shortlist_index.is_some() {
                tally.top3_hits += 1;
            }
            let record = CallRecord {
                overall: actual.overall,
                player: top.player.clone(),
                probability: top.probability,
            };
            if tally.worst_miss.as_ref().map_or(true, |w| record.probability > w.probability) {
                tally.worst_miss = Some(record);
            }

            observations.push(WeightObservation {
                error: (1.0 - assigned_probability / 100.0).clamp(0.0, 1.0),
                shares: top.components.shares(),
            });

            if top.probability >= CONFIDENT_MISS_THRESHOLD {
                let context = MissContext {
                    predicted_position: top.position,
                    actual_position: actual.position,
                    shares: top.components.shares(),
                    actual_shortlist_index: shortlist_index,
                };
                misses.push(MissExplanation {
                    overall: actual.overall,
                    manager: actual.manager.clone(),
                    predicted: top.player.clone(),
                    predicted_probability: top.probability,
                    actual: actual.player_name.clone(),
                    reason: classify_miss(&context),
                });
            }
        }
        if exact {
            tally.top3_hits += 1;
        }
    }

    let managers: Vec<ManagerAccuracy> = manager_order
        .into_iter()
        .filter_map(|manager| tallies.remove(&manager).map(|tally| (manager, tally)))
        .map(|(manager, tally)| {
            ManagerAccuracy {
                manager,
                picks_evaluated: tally.picks_evaluated,
                exact_hits: tally.exact_hits,
                top3_hits: tally.top3_hits,
                avg_assigned_probability: if tally.picks_evaluated == 0 {
                    0.0
                } else {
                    tally.probability_sum / f64::from(tally.picks_evaluated)
                },
                best_call: tally.best_call,
                worst_miss: tally.worst_miss,
            }
        })
        .collect();

    DraftEvaluation {
        picks_evaluated: managers.iter().map(|m| m.picks_evaluated).sum(),
        exact_hits: managers.iter().map(|m| m.exact_hits).sum(),
        top3_hits: managers.iter().map(|m| m.top3_hits).sum(),
        managers,
        misses,
        observations,
    }
}

// ---------------------------------------------------------------------------
// Weight update
// ---------------------------------------------------------------------------

/// Fold the misses into the persisted weights.
///
/// Per miss and component: `error x (share - 0.2)` is the directional delta.
/// Deltas average across misses, scale by the learning rate, and land through
/// an exponential moving average against the stored weights, clamped into the
/// configured bounds. Smoothing damps single-draft overcorrection while still
/// allowing slow long-run drift.
pub fn updated_weights(
    previous: CalibrationWeights,
    observations: &[WeightObservation],
    picks_evaluated: u32,
    config: &CalibrationConfig,
) -> CalibrationWeights {
    let mut next = previous.clone();
    next.sample_size = previous.sample_size.saturating_add(picks_evaluated);

    if observations.is_empty() {
        return next.clamped(config.weight_floor, config.weight_ceiling);
    }

    let count = observations.len() as f64;
    let mut delta = ScoreComponents::default();
    for observation in observations {
        let shares = observation.shares;
        delta.adp += observation.error * (shares.adp - EVEN_SHARE);
        delta.need += observation.error * (shares.need - EVEN_SHARE);
        delta.tendency += observation.error * (shares.tendency - EVEN_SHARE);
        delta.news += observation.error * (shares.news - EVEN_SHARE);
        delta.rookie += observation.error * (shares.rookie - EVEN_SHARE);
    }
    let delta = delta.scaled(1.0 / count);

    let alpha = config.ema_smoothing;
    let rate = config.learning_rate;
    let blend = |old: f64, component_delta: f64| -> f64 {
        let candidate = old * (1.0 - rate * component_delta);
        alpha * old + (1.0 - alpha) * candidate
    };

    next.adp = blend(previous.adp, delta.adp);
    next.need = blend(previous.need, delta.need);
    next.tendency = blend(previous.tendency, delta.tendency);
    next.news = blend(previous.news, delta.news);
    next.rookie = blend(previous.rookie, delta.rookie);

    next.clamped(config.weight_floor, config.weight_ceiling)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
