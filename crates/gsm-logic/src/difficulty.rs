//! Difficulty levels and the day-phase difficulty curve.
//!
//! A run is split into three phases by day number:
//!
//! | Days | Phase |
//! |------|-------|
//! | 1–3  | start |
//! | 4–7  | mid   |
//! | 8+   | late  |
//!
//! Each content pack maps the phases to a [`Difficulty`].

use serde::{Deserialize, Serialize};

/// Ordered difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

/// Outcome of a resolved case, used for the adaptive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Success,
    Failure,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Event pressure the scorer treats as an ideal match for this level.
    pub fn target_pressure(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 2.8,
            Difficulty::Hard => 4.2,
        }
    }

    /// One level up after a success, one level down after a failure.
    /// Saturates at both ends.
    pub fn step(self, outcome: CaseOutcome) -> Difficulty {
        match (outcome, self) {
            (CaseOutcome::Success, Difficulty::Easy) => Difficulty::Normal,
            (CaseOutcome::Success, _) => Difficulty::Hard,
            (CaseOutcome::Failure, Difficulty::Hard) => Difficulty::Normal,
            (CaseOutcome::Failure, _) => Difficulty::Easy,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a run, derived from the day number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Start,
    Mid,
    Late,
}

impl DayPhase {
    pub fn for_day(day: u32) -> DayPhase {
        match day {
            0..=3 => DayPhase::Start,
            4..=7 => DayPhase::Mid,
            _ => DayPhase::Late,
        }
    }
}

/// Difficulty per run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    pub start: Difficulty,
    pub mid: Difficulty,
    pub late: Difficulty,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            start: Difficulty::Easy,
            mid: Difficulty::Normal,
            late: Difficulty::Hard,
        }
    }
}

impl DifficultyCurve {
    /// The same difficulty for every phase.
    pub fn flat(difficulty: Difficulty) -> Self {
        Self {
            start: difficulty,
            mid: difficulty,
            late: difficulty,
        }
    }

    pub fn for_phase(&self, phase: DayPhase) -> Difficulty {
        match phase {
            DayPhase::Start => self.start,
            DayPhase::Mid => self.mid,
            DayPhase::Late => self.late,
        }
    }

    pub fn for_day(&self, day: u32) -> Difficulty {
        self.for_phase(DayPhase::for_day(day))
    }
}
