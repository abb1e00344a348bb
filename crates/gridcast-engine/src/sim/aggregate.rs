// Trial outcome aggregation.
//
// Tabulates, across trials, which players landed at each tracked overall
// slot, then emits probability-ranked shortlists.

use std::collections::{BTreeMap, HashMap};

use gridcast_core::player::{Position, RankingPoolEntry};

use super::order::round_and_pick;
use super::scoring::ScoreComponents;
use crate::forecast::{PickForecast, TargetEntry};

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SlotStat {
    position: Position,
    count: usize,
    component_sum: ScoreComponents,
}

/// Per-slot frequency tables filled in while trials run.
#[derive(Debug, Clone)]
pub struct OutcomeAggregator {
    /// slot -> player name -> stats. BTreeMap keeps slot iteration in draft
    /// order.
    slots: BTreeMap<u32, HashMap<String, SlotStat>>,
}

impl OutcomeAggregator {
    /// Track the given overall slots. Picks at any other slot are ignored.
    pub fn new(slots_of_interest: &[u32]) -> Self {
        OutcomeAggregator {
            slots: slots_of_interest.iter().map(|&s| (s, HashMap::new())).collect(),
        }
    }

    /// Record one trial pick landing at `overall`.
    pub fn record(&mut self, overall: u32, chosen: &RankingPoolEntry, components: &ScoreComponents) {
        let Some(table) = self.slots.get_mut(&overall) else {
            return;
        };
        let stat = table.entry(chosen.name.clone()).or_insert(SlotStat {
            position: chosen.position,
            count: 0,
            component_sum: ScoreComponents::default(),
        });
        stat.count += 1;
        stat.component_sum.accumulate(components);
    }

    /// Collapse the tables into per-slot shortlists.
    ///
    /// Entries sort by hit count descending; exact count ties break by player
    /// name ascending, so output is deterministic across runs.
    pub fn finish(
        self,
        trials: usize,
        team_count: usize,
        shortlist_size: usize,
        manager_names: &[String],
    ) -> Vec<PickForecast> {
        let trials = trials.max(1);
        self.slots
            .into_iter()
            .map(|(overall, table)| {
                let mut entries: Vec<(String, SlotStat)> = table.into_iter().collect();
                entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)));
                entries.truncate(shortlist_size);

                let top_targets = entries
                    .into_iter()
                    .map(|(player, stat)| {
                        let probability =
                            ((stat.count as f64 / trials as f64) * 100.0).round() as u8;
                        let components = stat.component_sum.scaled(1.0 / stat.count.max(1) as f64);
                        TargetEntry {
                            player,
                            position: stat.position,
                            probability: probability.min(100),
                            components,
                            rationale: rationale_for(stat.position),
                        }
                    })
                    .collect();

                let (round, pick) = round_and_pick(team_count, overall);
                let manager_index = super::order::manager_for_overall(team_count, overall);
                PickForecast {
                    overall,
                    round,
                    pick,
                    manager: manager_names
                        .get(manager_index)
                        .cloned()
                        .unwrap_or_else(|| format!("Slot {}", manager_index + 1)),
                    top_targets,
                    scenario_targets: None,
                }
            })
            .collect()
    }
}

/// Short templated rationale keyed by position.
pub fn rationale_for(position: Position) -> String {
    match position {
        Position::Quarterback => "Quarterback value meets roster timing".to_string(),
        Position::RunningBack => "Workhorse scarcity drives demand at RB".to_string(),
        Position::WideReceiver => "Perimeter depth makes WR the steady play".to_string(),
        Position::TightEnd => "Positional leverage opportunity at TE".to_string(),
    }
}
