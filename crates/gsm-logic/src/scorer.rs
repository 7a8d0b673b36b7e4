//! Candidate scoring — multi-factor weighting of every eligible event.
//!
//! Each event's weight is built from:
//! - Mastery gap: weak topics score higher
//! - Mistake pressure: topics the learner recently got wrong
//! - Meter need: events whose impact would pull a meter back toward target
//! - Difficulty fit: pressure close to the current difficulty's target
//! - Mode fit: multiplier for matching the intended mode
//! - A small random jitter added after the multiplier
//!
//! ```text
//! weight = (BASE + mastery + mistakes + meters + difficulty) × mode + jitter
//! ```
//!
//! The result is floored at [`MIN_WEIGHT`] so the sampler always has a
//! positive total.

use serde::{Deserialize, Serialize};

use crate::context::PlanContext;
use crate::difficulty::Difficulty;
use crate::events::Event;
use crate::modes::Mode;
use crate::rng::RandomSource;

pub const BASE_WEIGHT: f64 = 0.6;
pub const MASTERY_FACTOR: f64 = 1.8;
pub const MISTAKE_BASE: f64 = 0.6;
pub const MISTAKE_SHARE_FACTOR: f64 = 1.2;
/// Meter value the director steers toward.
pub const METER_TARGET: f64 = 60.0;
pub const METER_IMPACT_DIVISOR: f64 = 5.0;
/// Discount applied when a negative impact would bleed off a surplus.
pub const METER_SURPLUS_FACTOR: f64 = 0.75;
pub const MODE_MATCH_MULTIPLIER: f64 = 1.35;
pub const MODE_MISMATCH_MULTIPLIER: f64 = 0.85;
pub const RANDOM_JITTER: f64 = 0.25;
pub const MIN_WEIGHT: f64 = 0.01;

/// Per-factor contributions, kept for the debug overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub mastery: f64,
    pub mistakes: f64,
    pub meters: f64,
    pub difficulty: f64,
    /// The multiplier applied, not an additive term.
    pub mode: f64,
    pub randomness: f64,
}

/// A scored event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub event_id: String,
    pub topic: String,
    pub mode: Mode,
    pub weight: f64,
    pub breakdown: ScoreBreakdown,
}

pub fn mastery_contribution(event: &Event, ctx: &PlanContext) -> f64 {
    (1.0 - ctx.mastery(&event.topic)) * MASTERY_FACTOR
}

pub fn mistake_contribution(event: &Event, ctx: &PlanContext) -> f64 {
    let for_topic = ctx.mistakes_for_topic(&event.topic);
    if for_topic == 0 {
        return 0.0;
    }
    let total = ctx.mistake_count() as f64;
    MISTAKE_BASE + (for_topic as f64 / total) * MISTAKE_SHARE_FACTOR
}

/// Reward events whose impact moves a meter back toward [`METER_TARGET`].
///
/// A positive delta pays off in proportion to how far the meter sits below
/// target; a negative delta pays off (discounted) in proportion to how far it
/// sits above. Meters missing from the context count as on target.
pub fn meter_contribution(event: &Event, ctx: &PlanContext) -> f64 {
    let Some(impact) = &event.meter_impact else {
        return 0.0;
    };

    impact
        .deltas()
        .map(|(meter, delta)| {
            let current = ctx.meter(meter).map_or(METER_TARGET, f64::from);
            if delta > 0.0 {
                let deficit = ((METER_TARGET - current) / METER_TARGET).max(0.0);
                deficit * delta.abs() / METER_IMPACT_DIVISOR
            } else if delta < 0.0 {
                let surplus = ((current - METER_TARGET) / (100.0 - METER_TARGET)).max(0.0);
                surplus * delta.abs() / METER_IMPACT_DIVISOR * METER_SURPLUS_FACTOR
            } else {
                0.0
            }
        })
        .sum()
}

pub fn difficulty_contribution(event: &Event, difficulty: Difficulty) -> f64 {
    let target = difficulty.target_pressure();
    let gap = (event.pressure as f64 - target).abs();
    (1.0 - gap / target.max(1.0)).max(0.0)
}

pub fn mode_multiplier(mode: Mode, intended: Mode) -> f64 {
    if mode == intended {
        MODE_MATCH_MULTIPLIER
    } else {
        MODE_MISMATCH_MULTIPLIER
    }
}

/// Score one event. Consumes exactly one draw from `rng`.
pub fn score_event<R>(
    event: &Event,
    ctx: &PlanContext,
    difficulty: Difficulty,
    intended: Mode,
    rng: &mut R,
) -> Candidate
where
    R: RandomSource + ?Sized,
{
    let mode = event.mode();
    let breakdown = ScoreBreakdown {
        mastery: mastery_contribution(event, ctx),
        mistakes: mistake_contribution(event, ctx),
        meters: meter_contribution(event, ctx),
        difficulty: difficulty_contribution(event, difficulty),
        mode: mode_multiplier(mode, intended),
        randomness: rng.next_f64() * RANDOM_JITTER,
    };

    let additive = BASE_WEIGHT
        + breakdown.mastery
        + breakdown.mistakes
        + breakdown.meters
        + breakdown.difficulty;
    let raw = additive * breakdown.mode + breakdown.randomness;
    let weight = if raw.is_finite() {
        raw.max(MIN_WEIGHT)
    } else {
        MIN_WEIGHT
    };

    Candidate {
        event_id: event.id.clone(),
        topic: event.topic.clone(),
        mode,
        weight,
        breakdown,
    }
}

/// Score events in order, one draw each.
pub fn score_candidates<'a, R>(
    events: impl IntoIterator<Item = &'a Event>,
    ctx: &PlanContext,
    difficulty: Difficulty,
    intended: Mode,
    rng: &mut R,
) -> Vec<Candidate>
where
    R: RandomSource + ?Sized,
{
    events
        .into_iter()
        .map(|event| score_event(event, ctx, difficulty, intended, rng))
        .collect()
}
