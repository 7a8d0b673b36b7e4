//! Learning modes and the mode distribution controller.
//!
//! The director wants, over a whole run, roughly 70% application cases,
//! 20% recall drills and 10% boss setup. Each call picks the mode with the
//! largest deficit against that target:
//!
//! ```text
//! deficit(mode) = target(mode) × (total + 1) − count(mode)
//! ```
//!
//! Individual draws stay weighted-random, so the selected mode can differ
//! from the intended one. Counting the *actual* selections means the
//! deficits correct for that drift on later calls.

use serde::{Deserialize, Serialize};

/// Pedagogical purpose of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Application,
    Recall,
    BossSetup,
}

impl Mode {
    /// All modes in tie-break order.
    pub const ALL: [Mode; 3] = [Mode::Application, Mode::Recall, Mode::BossSetup];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Application => "application",
            Mode::Recall => "recall",
            Mode::BossSetup => "boss_setup",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Application => "Application",
            Mode::Recall => "Recall",
            Mode::BossSetup => "Boss setup",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per mode, keyed by the mode's wire name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeTable<T> {
    pub application: T,
    pub recall: T,
    pub boss_setup: T,
}

impl<T> ModeTable<T> {
    pub fn from_fn(mut f: impl FnMut(Mode) -> T) -> Self {
        Self {
            application: f(Mode::Application),
            recall: f(Mode::Recall),
            boss_setup: f(Mode::BossSetup),
        }
    }

    pub fn get(&self, mode: Mode) -> &T {
        match mode {
            Mode::Application => &self.application,
            Mode::Recall => &self.recall,
            Mode::BossSetup => &self.boss_setup,
        }
    }

    pub fn get_mut(&mut self, mode: Mode) -> &mut T {
        match mode {
            Mode::Application => &mut self.application,
            Mode::Recall => &mut self.recall,
            Mode::BossSetup => &mut self.boss_setup,
        }
    }
}

impl<T> std::ops::Index<Mode> for ModeTable<T> {
    type Output = T;

    fn index(&self, mode: Mode) -> &T {
        self.get(mode)
    }
}

/// Selection counters per mode. Only ever incremented.
pub type ModeCounts = ModeTable<u64>;

impl ModeCounts {
    pub fn total(&self) -> u64 {
        self.application + self.recall + self.boss_setup
    }

    pub fn increment(&mut self, mode: Mode) {
        *self.get_mut(mode) += 1;
    }
}

/// Long-run target share per mode.
pub const TARGET_DISTRIBUTION: ModeTable<f64> = ModeTable {
    application: 0.7,
    recall: 0.2,
    boss_setup: 0.1,
};

/// Deficit of every mode given current counts.
pub fn deficits(counts: &ModeCounts, target: &ModeTable<f64>) -> ModeTable<f64> {
    let next_total = (counts.total() + 1) as f64;
    ModeTable::from_fn(|mode| target[mode] * next_total - counts[mode] as f64)
}

/// The most under-served mode. Ties go to the earlier mode in [`Mode::ALL`].
pub fn intended_mode(counts: &ModeCounts, target: &ModeTable<f64>) -> Mode {
    let deficits = deficits(counts, target);
    let mut best = Mode::Application;
    for mode in Mode::ALL.into_iter().skip(1) {
        if deficits[mode] > deficits[best] {
            best = mode;
        }
    }
    best
}

/// Target, observed share, and deficit per mode, for debug display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeDistribution {
    pub target: ModeTable<f64>,
    pub actual: ModeTable<f64>,
    pub deficits: ModeTable<f64>,
}

impl ModeDistribution {
    pub fn from_counts(counts: &ModeCounts, target: &ModeTable<f64>) -> Self {
        let total = counts.total();
        let actual = ModeTable::from_fn(|mode| {
            if total == 0 {
                0.0
            } else {
                counts[mode] as f64 / total as f64
            }
        });
        Self {
            target: *target,
            actual,
            deficits: deficits(counts, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pick_is_application() {
        let counts = ModeCounts::default();
        assert_eq!(intended_mode(&counts, &TARGET_DISTRIBUTION), Mode::Application);
    }

    #[test]
    fn deficit_formula() {
        let counts = ModeCounts {
            application: 3,
            recall: 0,
            boss_setup: 0,
        };
        let d = deficits(&counts, &TARGET_DISTRIBUTION);
        assert!((d.application - (0.7 * 4.0 - 3.0)).abs() < 1e-12);
        assert!((d.recall - 0.8).abs() < 1e-12);
        assert!((d.boss_setup - 0.4).abs() < 1e-12);
        assert_eq!(intended_mode(&counts, &TARGET_DISTRIBUTION), Mode::Recall);
    }

    #[test]
    fn ties_prefer_earlier_mode() {
        let even = ModeTable {
            application: 1.0 / 3.0,
            recall: 1.0 / 3.0,
            boss_setup: 1.0 / 3.0,
        };
        assert_eq!(intended_mode(&ModeCounts::default(), &even), Mode::Application);
        let counts = ModeCounts {
            application: 1,
            recall: 0,
            boss_setup: 0,
        };
        assert_eq!(intended_mode(&counts, &even), Mode::Recall);
    }

    #[test]
    fn following_intent_converges_to_target() {
        // If every selection matches the intended mode, shares converge exactly.
        let mut counts = ModeCounts::default();
        for _ in 0..1000 {
            let mode = intended_mode(&counts, &TARGET_DISTRIBUTION);
            counts.increment(mode);
        }
        let dist = ModeDistribution::from_counts(&counts, &TARGET_DISTRIBUTION);
        assert!((dist.actual.application - 0.7).abs() < 0.01);
        assert!((dist.actual.recall - 0.2).abs() < 0.01);
        assert!((dist.actual.boss_setup - 0.1).abs() < 0.01);
    }

    #[test]
    fn empty_distribution_reports_zero_actual() {
        let dist = ModeDistribution::from_counts(&ModeCounts::default(), &TARGET_DISTRIBUTION);
        assert_eq!(dist.actual, ModeTable::default());
        assert_eq!(dist.target, TARGET_DISTRIBUTION);
        assert!((dist.deficits.application - 0.7).abs() < 1e-12);
    }

    #[test]
    fn counts_serialize_by_mode_name() {
        let mut counts = ModeCounts::default();
        counts.increment(Mode::BossSetup);
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["boss_setup"], 1);
        assert_eq!(counts.total(), 1);
        assert_eq!(serde_json::to_string(&Mode::BossSetup).unwrap(), "\"boss_setup\"");
    }
}
