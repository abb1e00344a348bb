// Forecast service: wires providers, stores, and the simulation engine into
// the three caller-facing operations (predict, board drift, retrospective).

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use gridcast_core::cache::TtlCache;
use gridcast_core::config::{CalibrationConfig, SimulationConfig};
use gridcast_core::history::{LeagueHistory, ManagerHistory};
use gridcast_core::providers::{
    DraftResultProvider, LeagueFormat, LeagueHistoryProvider, ProviderError, RankingPoolFetch,
    RankingProvider,
};
use gridcast_core::store::{SqliteStore, StoreError};
use gridcast_core::weights::CalibrationWeights;

use crate::dna::{infer_dna, ManagerDna};
use crate::drift::{
    compute_drift_report, drift_store_key, iso_week_key, previous_iso_week_key, BoardDriftReport,
    BoardDriftSnapshot,
};
use crate::forecast::{PickForecast, PredictionSnapshot};
use crate::retro::calibrate::{evaluate_draft, updated_weights};
use crate::retro::RetrospectiveReport;
use crate::sim::order::overall_picks_for_slot;
use crate::sim::{run_trials, OutcomeAggregator, Scenario, SimulationRequest};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("no prediction snapshot stored for league {league_id} season {season}")]
    MissingSnapshot { league_id: String, season: String },
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub league_id: String,
    pub season: String,
    /// The user's draft slot, 1-indexed.
    pub user_slot: usize,
    pub team_count: usize,
    pub rounds: usize,
    pub trials: usize,
    /// Overall latency budget; honored by capping the trial count, never by
    /// aborting a trial in flight.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub scenario: Option<Scenario>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub league_id: String,
    pub season: String,
    /// Forecasts for the user's picks, in draft order.
    pub picks: Vec<PickForecast>,
    pub trials_run: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriftRequest {
    pub league_id: String,
    pub user_slot: usize,
    pub team_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetroRequest {
    pub league_id: String,
    pub season: String,
}

// ---------------------------------------------------------------------------
// Trial bounds
// ---------------------------------------------------------------------------

/// Interactive-latency bounds on the Monte Carlo trial count.
const MIN_TRIALS: usize = 80;
const MAX_TRIALS: usize = 500;

/// Rough cost of one trial, used to convert a timeout into a trial cap.
const TRIAL_BUDGET_MS: u64 = 2;

fn effective_trials(requested: usize, timeout_ms: Option<u64>) -> usize {
    let mut trials = requested.clamp(MIN_TRIALS, MAX_TRIALS);
    if let Some(budget) = timeout_ms {
        let cap = (budget / TRIAL_BUDGET_MS) as usize;
        trials = trials.min(cap.max(MIN_TRIALS));
    }
    trials
}

/// Cache lifetime for ranking-pool fetches within one process.
const POOL_CACHE_TTL: StdDuration = StdDuration::from_secs(600);

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct ForecastService<R, H, D> {
    rankings: R,
    history: H,
    drafts: D,
    store: Arc<SqliteStore>,
    pool_cache: TtlCache<RankingPoolFetch>,
    simulation: SimulationConfig,
    calibration: CalibrationConfig,
    snapshot_ttl_days: i64,
}

impl<R, H, D> ForecastService<R, H, D>
where
    R: RankingProvider,
    H: LeagueHistoryProvider,
    D: DraftResultProvider,
{
    pub fn new(
        rankings: R,
        history: H,
        drafts: D,
        store: Arc<SqliteStore>,
        simulation: SimulationConfig,
        calibration: CalibrationConfig,
        snapshot_ttl_days: i64,
    ) -> Self {
        ForecastService {
            rankings,
            history,
            drafts,
            store,
            pool_cache: TtlCache::new(),
            simulation,
            calibration,
            snapshot_ttl_days,
        }
    }

    // -- Prediction ---------------------------------------------------------

    /// Run the Monte Carlo forecast for a league and persist the resulting
    /// snapshot for later retrospective scoring.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionResponse, EngineError> {
        if request.team_count == 0 || request.rounds == 0 {
            return Err(EngineError::InvalidRequest(
                "team_count and rounds must be greater than 0".into(),
            ));
        }
        if request.user_slot == 0 || request.user_slot > request.team_count {
            return Err(EngineError::InvalidRequest(format!(
                "user_slot must be between 1 and {}, got {}",
                request.team_count, request.user_slot
            )));
        }

        let league = self.history.fetch_history(&request.league_id).await?;
        let pool = self.fetch_pool_cached(league_format(&league)).await?;
        let dnas = self.manager_profiles(&league, request.team_count, &pool.entries);
        let manager_names: Vec<String> = dnas.iter().map(|d| d.manager.clone()).collect();

        let weights = self
            .store
            .load_weights(&request.league_id, &request.season)?
            .unwrap_or_else(|| CalibrationWeights::neutral(&request.league_id, &request.season))
            .clamped(self.calibration.weight_floor, self.calibration.weight_ceiling);

        let trials = effective_trials(request.trials, request.timeout_ms);
        if trials < request.trials {
            info!(
                "capping trial count {} -> {} for latency budget",
                request.trials, trials
            );
        }

        let sim_request = SimulationRequest {
            team_count: request.team_count,
            rounds: request.rounds,
            user_slot: request.user_slot,
            trials,
            superflex: league.superflex,
            candidate_pool: self.simulation.candidate_pool,
            shortlist_size: self.simulation.shortlist_size,
            scenario: None,
        };

        // Baseline run tracks every slot so the stored snapshot can score
        // all managers retrospectively.
        let all_slots: Vec<u32> = (1..=sim_request.total_picks()).collect();
        let mut aggregator = OutcomeAggregator::new(&all_slots);
        let mut rng = ChaCha8Rng::from_entropy();
        run_trials(&pool.entries, &dnas, &sim_request, &weights, &mut aggregator, &mut rng);
        let all_picks = aggregator.finish(
            trials,
            request.team_count,
            self.simulation.shortlist_size,
            &manager_names,
        );

        let snapshot = PredictionSnapshot {
            league_id: request.league_id.clone(),
            season: request.season.clone(),
            trials,
            picks: all_picks.clone(),
            created_at: Utc::now(),
        };
        self.store.upsert_json(
            &PredictionSnapshot::store_key(&request.league_id, &request.season),
            &snapshot,
            None,
        )?;

        let user_slots = overall_picks_for_slot(
            request.team_count,
            request.rounds,
            request.user_slot,
        );
        let mut user_picks: Vec<PickForecast> = all_picks
            .into_iter()
            .filter(|p| user_slots.contains(&p.overall))
            .collect();

        // Scenario variant: a second conditioned run over the user's slots.
        if let Some(scenario) = request.scenario.filter(|s| !s.is_empty()) {
            let scenario_request = SimulationRequest {
                scenario: Some(scenario),
                ..sim_request
            };
            let mut scenario_aggregator = OutcomeAggregator::new(&user_slots);
            run_trials(
                &pool.entries,
                &dnas,
                &scenario_request,
                &weights,
                &mut scenario_aggregator,
                &mut rng,
            );
            let scenario_picks = scenario_aggregator.finish(
                trials,
                request.team_count,
                self.simulation.shortlist_size,
                &manager_names,
            );
            for pick in &mut user_picks {
                if let Some(variant) = scenario_picks.iter().find(|p| p.overall == pick.overall) {
                    pick.scenario_targets = Some(variant.top_targets.clone());
                }
            }
        }

        Ok(PredictionResponse {
            league_id: request.league_id,
            season: request.season,
            picks: user_picks,
            trials_run: trials,
        })
    }

    // -- Board drift --------------------------------------------------------

    /// Capture this week's board and manager profiles, then report drift
    /// against the prior week.
    pub async fn board_drift(
        &self,
        request: DriftRequest,
    ) -> Result<BoardDriftReport, EngineError> {
        if request.user_slot == 0 || request.user_slot > request.team_count {
            return Err(EngineError::InvalidRequest(format!(
                "user_slot must be between 1 and {}, got {}",
                request.team_count, request.user_slot
            )));
        }

        let league = self.history.fetch_history(&request.league_id).await?;
        let pool = self.fetch_pool_cached(league_format(&league)).await?;
        let dnas = self.manager_profiles(&league, request.team_count, &pool.entries);

        let now = Utc::now();
        let week_key = iso_week_key(now);
        let current = BoardDriftSnapshot {
            league_id: request.league_id.clone(),
            week_key: week_key.clone(),
            entries: pool.entries.clone(),
            manager_dna: dnas,
            saved_at: now,
        };

        // Idempotent last-write-wins upsert; repeat calls within the same
        // week simply refresh the snapshot.
        self.store.upsert_json(
            &drift_store_key(&request.league_id, &week_key),
            &current,
            Some(Duration::days(self.snapshot_ttl_days)),
        )?;

        let previous: Option<BoardDriftSnapshot> = self.store.get_json(&drift_store_key(
            &request.league_id,
            &previous_iso_week_key(now),
        ))?;

        Ok(compute_drift_report(
            previous.as_ref(),
            &current,
            &pool.adjustments,
            request.user_slot,
            request.team_count,
        ))
    }

    // -- Retrospective ------------------------------------------------------

    /// Score a stored prediction against the completed real draft and fold
    /// the misses into the persisted calibration weights.
    pub async fn retrospective(
        &self,
        request: RetroRequest,
    ) -> Result<RetrospectiveReport, EngineError> {
        let snapshot: PredictionSnapshot = self
            .store
            .get_json(&PredictionSnapshot::store_key(&request.league_id, &request.season))?
            .ok_or_else(|| EngineError::MissingSnapshot {
                league_id: request.league_id.clone(),
                season: request.season.clone(),
            })?;

        let result = self.drafts.fetch_latest_draft(&request.league_id).await?;
        let evaluation = evaluate_draft(&snapshot, &result);
        info!(
            "retrospective for league {}: {} picks, {} exact, {} shortlisted",
            request.league_id,
            evaluation.picks_evaluated,
            evaluation.exact_hits,
            evaluation.top3_hits
        );

        let calibration = self.calibration.clone();
        let weights = self.store.update_weights(
            &request.league_id,
            &request.season,
            |previous| {
                updated_weights(
                    previous,
                    &evaluation.observations,
                    evaluation.picks_evaluated,
                    &calibration,
                )
            },
        )?;

        Ok(RetrospectiveReport {
            league_id: request.league_id,
            season: request.season,
            picks_evaluated: evaluation.picks_evaluated,
            exact_hits: evaluation.exact_hits,
            top3_hits: evaluation.top3_hits,
            managers: evaluation.managers,
            misses: evaluation.misses,
            weights,
        })
    }

    // -- Internals ----------------------------------------------------------

    async fn fetch_pool_cached(
        &self,
        format: LeagueFormat,
    ) -> Result<RankingPoolFetch, EngineError> {
        let key = format!("pool:{:?}:{}", format, self.simulation.pool_size);
        if let Some(cached) = self.pool_cache.get(&key) {
            return Ok(cached);
        }
        let fetch = self
            .rankings
            .fetch_pool(format, self.simulation.pool_size)
            .await?;
        self.pool_cache.put(&key, fetch.clone(), POOL_CACHE_TTL);
        Ok(fetch)
    }

    /// One profile per draft slot, in slot order. Managers missing from the
    /// fetched history get a profile inferred from an empty record; inference
    /// is total, so this still yields usable defaults.
    fn manager_profiles(
        &self,
        league: &LeagueHistory,
        team_count: usize,
        pool: &[gridcast_core::player::RankingPoolEntry],
    ) -> Vec<ManagerDna> {
        (1..=team_count as u32)
            .map(|slot| match league.managers.iter().find(|m| m.roster_id == slot) {
                Some(manager) => infer_dna(manager, pool, league.dynasty, team_count),
                None => {
                    warn!("no history for roster slot {}; using defaults", slot);
                    let placeholder = ManagerHistory {
                        manager_name: format!("Slot {slot}"),
                        roster_id: slot,
                        wins: 0,
                        losses: 0,
                        points_for: 0.0,
                        points_against: 0.0,
                        weekly_scores: vec![],
                        roster_players: vec![],
                    };
                    infer_dna(&placeholder, &[], league.dynasty, team_count)
                }
            })
            .collect()
    }
}

fn league_format(league: &LeagueHistory) -> LeagueFormat {
    if league.dynasty {
        LeagueFormat::Dynasty
    } else {
        LeagueFormat::Redraft
    }
}
