// Archetype derivation.
//
// An ordered list of (predicate, archetype) rules evaluated top to bottom;
// the first matching rule wins. Specific combinations sit above the generic
// fallbacks, so rule order is load-bearing.

use serde::{Deserialize, Serialize};

use super::PanicResponse;

/// Named drafting persona assigned to every manager profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// Over-corrects after every setback.
    TiltProne,
    /// Rebuilder hoarding young players in dynasty formats.
    YouthMovement,
    /// Builds rosters around same-team quarterback pairings.
    StackArchitect,
    /// Reaches hard whenever the room starts a positional run.
    RunChaser,
    /// Drafts on feel, well ahead of consensus.
    GutReacher,
    /// Winning roster, little interest in youth.
    VeteranStabilizer,
    /// Contender trading board value for immediate production.
    WinNowAggressor,
    /// Takes what the board gives, never rattled.
    BoardDisciplined,
    /// Chases upside and young players regardless of record.
    UpsideHunter,
    /// No strong signal in any direction.
    BalancedOperator,
}

impl Archetype {
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::TiltProne => "Tilt Prone",
            Archetype::YouthMovement => "Youth Movement",
            Archetype::StackArchitect => "Stack Architect",
            Archetype::RunChaser => "Run Chaser",
            Archetype::GutReacher => "Gut Reacher",
            Archetype::VeteranStabilizer => "Veteran Stabilizer",
            Archetype::WinNowAggressor => "Win-Now Aggressor",
            Archetype::BoardDisciplined => "Board Disciplined",
            Archetype::UpsideHunter => "Upside Hunter",
            Archetype::BalancedOperator => "Balanced Operator",
        }
    }
}

/// Everything the rule table looks at.
#[derive(Debug, Clone, Copy)]
pub struct ArchetypeInputs {
    pub reach_frequency: f64,
    pub rookie_appetite: f64,
    pub stack_tendency: f64,
    pub panic_response: PanicResponse,
    pub win_rate: f64,
    pub dynasty: bool,
}

type Rule = (&'static str, fn(&ArchetypeInputs) -> bool, Archetype);

/// Ordered rule table. First match wins.
const RULES: &[Rule] = &[
    (
        "full panic dominates everything else",
        |i| i.panic_response == PanicResponse::FullPanic,
        Archetype::TiltProne,
    ),
    (
        "losing dynasty roster stacked with youth",
        |i| i.dynasty && i.rookie_appetite >= 0.6 && i.win_rate < 0.45,
        Archetype::YouthMovement,
    ),
    (
        "heavy same-team pairing habit",
        |i| i.stack_tendency >= 0.6,
        Archetype::StackArchitect,
    ),
    (
        "jumpy and reach-prone",
        |i| i.panic_response == PanicResponse::Jumpy && i.reach_frequency >= 0.5,
        Archetype::RunChaser,
    ),
    (
        "reaches far ahead of consensus",
        |i| i.reach_frequency >= 0.55,
        Archetype::GutReacher,
    ),
    (
        "winning and veteran-leaning",
        |i| i.win_rate >= 0.6 && i.rookie_appetite < 0.35,
        Archetype::VeteranStabilizer,
    ),
    (
        "contender paying up for immediate help",
        |i| i.win_rate >= 0.55 && i.reach_frequency >= 0.4,
        Archetype::WinNowAggressor,
    ),
    (
        "low reach, never rattled",
        |i| i.reach_frequency <= 0.2 && i.panic_response == PanicResponse::HoldSteady,
        Archetype::BoardDisciplined,
    ),
    (
        "youth-heavy regardless of record",
        |i| i.rookie_appetite >= 0.55,
        Archetype::UpsideHunter,
    ),
];

/// Walk the rule table in order and return the first match, falling back to
/// the neutral persona.
pub fn derive_archetype(inputs: &ArchetypeInputs) -> Archetype {
    RULES
        .iter()
        .find(|(_, predicate, _)| predicate(inputs))
        .map(|(_, _, archetype)| *archetype)
        .unwrap_or(Archetype::BalancedOperator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_inputs() -> ArchetypeInputs {
        ArchetypeInputs {
            reach_frequency: 0.3,
            rookie_appetite: 0.4,
            stack_tendency: 0.3,
            panic_response: PanicResponse::MildConcern,
            win_rate: 0.5,
            dynasty: false,
        }
    }

    #[test]
    fn neutral_inputs_fall_through_to_balanced() {
        assert_eq!(derive_archetype(&neutral_inputs()), Archetype::BalancedOperator);
    }

    #[test]
    fn full_panic_beats_all_other_signals() {
        let mut inputs = neutral_inputs();
        inputs.panic_response = PanicResponse::FullPanic;
        inputs.stack_tendency = 0.9;
        inputs.rookie_appetite = 0.9;
        assert_eq!(derive_archetype(&inputs), Archetype::TiltProne);
    }

    #[test]
    fn losing_dynasty_youth_roster_is_youth_movement() {
        let mut inputs = neutral_inputs();
        inputs.dynasty = true;
        inputs.rookie_appetite = 0.7;
        inputs.win_rate = 0.3;
        assert_eq!(derive_archetype(&inputs), Archetype::YouthMovement);
    }

    #[test]
    fn redraft_youth_roster_is_not_youth_movement() {
        let mut inputs = neutral_inputs();
        inputs.dynasty = false;
        inputs.rookie_appetite = 0.7;
        inputs.win_rate = 0.3;
        assert_eq!(derive_archetype(&inputs), Archetype::UpsideHunter);
    }

    #[test]
    fn stacker_beats_reach_signal() {
        let mut inputs = neutral_inputs();
        inputs.stack_tendency = 0.7;
        inputs.reach_frequency = 0.7;
        assert_eq!(derive_archetype(&inputs), Archetype::StackArchitect);
    }

    #[test]
    fn jumpy_reacher_is_run_chaser() {
        let mut inputs = neutral_inputs();
        inputs.panic_response = PanicResponse::Jumpy;
        inputs.reach_frequency = 0.5;
        assert_eq!(derive_archetype(&inputs), Archetype::RunChaser);
    }

    #[test]
    fn calm_reacher_is_gut_reacher() {
        let mut inputs = neutral_inputs();
        inputs.reach_frequency = 0.6;
        assert_eq!(derive_archetype(&inputs), Archetype::GutReacher);
    }

    #[test]
    fn winning_veteran_roster_is_stabilizer() {
        let mut inputs = neutral_inputs();
        inputs.win_rate = 0.7;
        inputs.rookie_appetite = 0.2;
        assert_eq!(derive_archetype(&inputs), Archetype::VeteranStabilizer);
    }

    #[test]
    fn winning_reacher_with_youth_interest_is_win_now() {
        let mut inputs = neutral_inputs();
        inputs.win_rate = 0.6;
        inputs.rookie_appetite = 0.4;
        inputs.reach_frequency = 0.45;
        assert_eq!(derive_archetype(&inputs), Archetype::WinNowAggressor);
    }

    #[test]
    fn disciplined_drafter_detected() {
        let mut inputs = neutral_inputs();
        inputs.reach_frequency = 0.1;
        inputs.panic_response = PanicResponse::HoldSteady;
        assert_eq!(derive_archetype(&inputs), Archetype::BoardDisciplined);
    }

    #[test]
    fn every_rule_is_reachable() {
        // Each rule should fire for at least one constructed input.
        let mut seen = Vec::new();
        let candidates = [
            ArchetypeInputs { panic_response: PanicResponse::FullPanic, ..neutral_inputs() },
            ArchetypeInputs {
                dynasty: true,
                rookie_appetite: 0.8,
                win_rate: 0.2,
                ..neutral_inputs()
            },
            ArchetypeInputs { stack_tendency: 0.8, ..neutral_inputs() },
            ArchetypeInputs {
                panic_response: PanicResponse::Jumpy,
                reach_frequency: 0.52,
                ..neutral_inputs()
            },
            ArchetypeInputs { reach_frequency: 0.6, ..neutral_inputs() },
            ArchetypeInputs { win_rate: 0.65, rookie_appetite: 0.2, ..neutral_inputs() },
            ArchetypeInputs { win_rate: 0.58, reach_frequency: 0.45, ..neutral_inputs() },
            ArchetypeInputs {
                reach_frequency: 0.15,
                panic_response: PanicResponse::HoldSteady,
                ..neutral_inputs()
            },
            ArchetypeInputs { rookie_appetite: 0.6, ..neutral_inputs() },
            neutral_inputs(),
        ];
        for inputs in candidates {
            let archetype = derive_archetype(&inputs);
            if !seen.contains(&archetype) {
                seen.push(archetype);
            }
        }
        assert_eq!(seen.len(), 10, "expected all ten personas reachable, got {seen:?}");
    }
}
