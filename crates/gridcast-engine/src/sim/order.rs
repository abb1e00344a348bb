// Snake draft order arithmetic.

/// Draft order for a round (1-indexed). Odd rounds run 0..N-1, even rounds
/// reversed.
pub fn snake_order(team_count: usize, round: usize) -> Vec<usize> {
    let forward: Vec<usize> = (0..team_count).collect();
    if round % 2 == 1 {
        forward
    } else {
        forward.into_iter().rev().collect()
    }
}

/// Round and pick-within-round (both 1-indexed) for an overall pick number.
pub fn round_and_pick(team_count: usize, overall: u32) -> (u32, u32) {
    let team_count = team_count.max(1) as u32;
    let round = (overall - 1) / team_count + 1;
    let pick = (overall - 1) % team_count + 1;
    (round, pick)
}

/// Index of the manager on the clock at an overall pick number.
pub fn manager_for_overall(team_count: usize, overall: u32) -> usize {
    let (round, pick) = round_and_pick(team_count, overall);
    let order = snake_order(team_count, round as usize);
    order[(pick - 1) as usize]
}

/// All overall pick numbers belonging to a draft slot (1-indexed) across the
/// given number of rounds.
pub fn overall_picks_for_slot(team_count: usize, rounds: usize, slot: usize) -> Vec<u32> {
    let n = team_count as u32;
    (1..=rounds as u32)
        .map(|round| {
            let pick = if round % 2 == 1 {
                slot as u32
            } else {
                n + 1 - slot as u32
            };
            (round - 1) * n + pick
        })
        .collect()
}
