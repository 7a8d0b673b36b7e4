//! Time budgets attached to each decision.
//!
//! Every decision gets a response window and a review window; boss-setup
//! decisions also get a prep timer. Higher event pressure shortens the
//! response window while recent mistakes lengthen it, up to a cap.

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::modes::Mode;
use crate::rng::RandomSource;

pub const MIN_RESPONSE_MS: i64 = 45_000;
pub const PRESSURE_PENALTY_MS: i64 = 6_000;
pub const MISTAKE_LENIENCY_MS: i64 = 2_500;
pub const MAX_LENIENCY_MS: i64 = 20_000;
pub const REVIEW_EXTRA_MS: i64 = 30_000;
pub const REVIEW_JITTER_MS: f64 = 15_000.0;
pub const BOSS_PREP_EXTRA_MS: i64 = 60_000;

/// Base response window per difficulty.
pub fn base_window_ms(difficulty: Difficulty) -> i64 {
    match difficulty {
        Difficulty::Easy => 120_000,
        Difficulty::Normal => 95_000,
        Difficulty::Hard => 75_000,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Response,
    Review,
    BossPrep,
}

impl TimerKind {
    pub fn label(self) -> &'static str {
        match self {
            TimerKind::Response => "Response window",
            TimerKind::Review => "Review window",
            TimerKind::BossPrep => "Boss case prep",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorTimer {
    pub kind: TimerKind,
    pub label: String,
    pub duration_ms: u64,
}

impl DirectorTimer {
    fn new(kind: TimerKind, duration_ms: i64) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            duration_ms: duration_ms.max(0) as u64,
        }
    }
}

/// Response window in milliseconds.
pub fn response_window_ms(difficulty: Difficulty, pressure: u32, mistake_count: usize) -> i64 {
    let leniency = (mistake_count as i64)
        .saturating_mul(MISTAKE_LENIENCY_MS)
        .min(MAX_LENIENCY_MS);
    let window = base_window_ms(difficulty) - pressure as i64 * PRESSURE_PENALTY_MS + leniency;
    window.max(MIN_RESPONSE_MS)
}

/// Timers for a decision, always ordered response, review, then boss prep.
///
/// Consumes exactly one draw (for the review jitter).
pub fn generate_timers<R>(
    difficulty: Difficulty,
    pressure: u32,
    mistake_count: usize,
    mode: Mode,
    rng: &mut R,
) -> Vec<DirectorTimer>
where
    R: RandomSource + ?Sized,
{
    let base = base_window_ms(difficulty);
    let review = base + REVIEW_EXTRA_MS + (rng.next_f64() * REVIEW_JITTER_MS).round() as i64;

    let mut timers = vec![
        DirectorTimer::new(
            TimerKind::Response,
            response_window_ms(difficulty, pressure, mistake_count),
        ),
        DirectorTimer::new(TimerKind::Review, review),
    ];
    if mode == Mode::BossSetup {
        timers.push(DirectorTimer::new(
            TimerKind::BossPrep,
            base + BOSS_PREP_EXTRA_MS,
        ));
    }
    timers
}

/// `m:ss` display, rounded to whole seconds.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ((ms as f64) / 1000.0).round().max(0.0) as i64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::tests::ScriptedDraws;

    #[test]
    fn hard_high_pressure_hits_floor() {
        assert_eq!(response_window_ms(Difficulty::Hard, 5, 0), 45_000);
        assert_eq!(response_window_ms(Difficulty::Hard, 20, 0), 45_000);
    }

    #[test]
    fn pressure_shortens_mistakes_lengthen() {
        assert_eq!(response_window_ms(Difficulty::Easy, 0, 0), 120_000);
        assert_eq!(response_window_ms(Difficulty::Easy, 2, 0), 108_000);
        assert_eq!(response_window_ms(Difficulty::Easy, 2, 3), 115_500);
        // Leniency caps at 20s.
        assert_eq!(response_window_ms(Difficulty::Normal, 1, 100), 109_000);
    }

    #[test]
    fn timer_order_and_boss_prep() {
        let mut rng = ScriptedDraws::new(&[0.5]);
        let timers = generate_timers(Difficulty::Normal, 2, 0, Mode::Recall, &mut rng);
        let kinds: Vec<TimerKind> = timers.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TimerKind::Response, TimerKind::Review]);
        assert_eq!(timers[0].duration_ms, 83_000);
        assert_eq!(timers[1].duration_ms, 95_000 + 30_000 + 7_500);

        let mut rng = ScriptedDraws::new(&[0.0]);
        let timers = generate_timers(Difficulty::Hard, 5, 0, Mode::BossSetup, &mut rng);
        assert_eq!(timers.len(), 3);
        assert_eq!(timers[2].kind, TimerKind::BossPrep);
        assert_eq!(timers[2].duration_ms, 135_000);
        assert_eq!(timers[2].label, "Boss case prep");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(45_000), "0:45");
        assert_eq!(format_duration(120_000), "2:00");
        assert_eq!(format_duration(95_499), "1:35");
        assert_eq!(format_duration(-3_000), "0:00");
    }
}
