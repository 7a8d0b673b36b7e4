//! The director service — one content decision per simulated day.
//!
//! Each [`Director::plan_next`] call:
//!
//! 1. Normalizes the caller's [`PlanInput`] (day floored at 1, meters clamped)
//! 2. Resolves difficulty from the day phase (input override or config curve)
//! 3. Picks the intended mode from the running mode counts
//! 4. Scores every eligible event and draws one by weight
//! 5. Records the selection (anti-repeat id, actual-mode counter)
//! 6. Derives modifier labels and timers from the *actual* mode
//!
//! The director owns its RNG and counters and nothing else; game state such
//! as mastery, meters and mistakes is supplied fresh on every call.
//! A director must not be shared across threads without external locking,
//! but separate instances are fully independent.
//!
//! ```
//! use gsm_logic::context::PlanInput;
//! use gsm_logic::events::Event;
//! use gsm_logic::{Director, DirectorConfig};
//!
//! let mut director = Director::new(DirectorConfig {
//!     events: vec![Event::new("evt-1", "rent", 2), Event::new("evt-2", "notice", 3)],
//!     seed: Some(1),
//!     ..DirectorConfig::default()
//! });
//! let decision = director.plan_next(&PlanInput::for_day(1));
//! assert!(decision.event.is_some());
//! ```

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::context::{PlanContext, PlanInput};
use crate::difficulty::{Difficulty, DifficultyCurve};
use crate::events::Event;
use crate::map_modifiers::{collect_modifier_notes, filter_events_for_active_modifiers};
use crate::modes::{intended_mode, Mode, ModeCounts, ModeDistribution, TARGET_DISTRIBUTION};
use crate::modifiers::generate_modifiers;
use crate::rng::RngController;
use crate::sampler::{weighted_sample, WeightedItem};
use crate::scorer::{score_candidates, Candidate};
use crate::timers::{generate_timers, DirectorTimer};

/// Construction-time configuration, normally built from a content pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorConfig {
    pub events: Vec<Event>,
    #[serde(default)]
    pub difficulty_curve: DifficultyCurve,
    /// `None` seeds from the wall clock.
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Output of one `plan_next` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// `None` when no content is available.
    pub event: Option<Event>,
    pub day: u32,
    pub difficulty: Difficulty,
    /// Mode of the selected event (the intended mode when nothing was selected).
    pub mode: Mode,
    pub intended_mode: Mode,
    pub modifiers: Vec<String>,
    pub timers: Vec<DirectorTimer>,
    /// Notes from active campaign map modifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map_notes: Vec<String>,
}

/// Mutable state of one director. Only `plan_next` and `debug` touch it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeState {
    pub counts: ModeCounts,
    pub last_event_id: Option<String>,
    pub last_decision: Option<Decision>,
    pub last_context: Option<PlanContext>,
    pub last_intended_mode: Option<Mode>,
    pub debug_enabled: bool,
    pub last_candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugAction {
    /// Flip the overlay flag, then snapshot.
    Toggle,
    /// Snapshot without touching the flag.
    Peek,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDebugAction(pub String);

impl std::fmt::Display for UnknownDebugAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown debug action '{}' (expected toggle or peek)", self.0)
    }
}

impl std::error::Error for UnknownDebugAction {}

impl FromStr for DebugAction {
    type Err = UnknownDebugAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(DebugAction::Toggle),
            "peek" => Ok(DebugAction::Peek),
            other => Err(UnknownDebugAction(other.to_string())),
        }
    }
}

/// Director internals for the debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub enabled: bool,
    pub counts: ModeCounts,
    pub distribution: ModeDistribution,
    pub last_decision: Option<Decision>,
    pub last_context: Option<PlanContext>,
    pub intended_mode: Option<Mode>,
    /// Every candidate from the last call, heaviest first.
    pub candidates: Vec<Candidate>,
}

impl DebugSnapshot {
    /// The first `n` candidates (the overlay shows five).
    pub fn top_candidates(&self, n: usize) -> &[Candidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }
}

pub struct Director {
    events: Vec<Event>,
    difficulty_curve: DifficultyCurve,
    rng: RngController,
    runtime: RuntimeState,
}

fn wall_clock_seed() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(1)
}

impl Director {
    pub fn new(config: DirectorConfig) -> Self {
        let seed = config.seed.unwrap_or_else(wall_clock_seed);
        log::info!(
            "Director ready: {} events, seed {}",
            config.events.len(),
            seed
        );
        Self {
            events: config.events,
            difficulty_curve: config.difficulty_curve,
            rng: RngController::new(seed),
            runtime: RuntimeState::default(),
        }
    }

    pub fn seed(&self) -> i64 {
        self.rng.seed()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    /// Plan the next day's content.
    ///
    /// Never fails: with no configured events the decision carries
    /// `event: None`.
    ///
    /// # Panics
    ///
    /// Panics if weighted sampling fails on a non-empty candidate list,
    /// which the scorer's weight floor rules out.
    pub fn plan_next(&mut self, input: &PlanInput) -> Decision {
        let ctx = input.normalize();
        let day = ctx.day;
        let curve = input.difficulty_curve.unwrap_or(self.difficulty_curve);
        let difficulty = curve.for_day(day);
        let intended = intended_mode(&self.runtime.counts, &TARGET_DISTRIBUTION);

        let pool = filter_events_for_active_modifiers(&self.events, &input.active_map_modifiers);
        let eligible: Vec<&Event> = match &self.runtime.last_event_id {
            Some(last) if pool.len() > 1 => {
                let fresh: Vec<&Event> = pool.iter().copied().filter(|e| &e.id != last).collect();
                if fresh.is_empty() {
                    pool
                } else {
                    fresh
                }
            }
            _ => pool,
        };

        let candidates = score_candidates(
            eligible.iter().copied(),
            &ctx,
            difficulty,
            intended,
            &mut self.rng,
        );
        for c in &candidates {
            log::trace!(
                "candidate {} ({}): weight {:.3} {:?}",
                c.event_id,
                c.mode,
                c.weight,
                c.breakdown
            );
        }

        let selected: Option<&Event> = if candidates.is_empty() {
            log::warn!("Director has no events to plan for day {}", day);
            None
        } else {
            let items: Vec<WeightedItem<usize>> = candidates
                .iter()
                .enumerate()
                .map(|(i, c)| WeightedItem::new(i, c.weight))
                .collect();
            match weighted_sample(&items, &mut self.rng) {
                Ok(&index) => Some(eligible[index]),
                Err(err) => panic!("director candidate weights violated the floor: {err}"),
            }
        };

        let mode = match selected {
            Some(event) => {
                let mode = event.mode();
                self.runtime.last_event_id = Some(event.id.clone());
                self.runtime.counts.increment(mode);
                mode
            }
            None => intended,
        };

        let modifiers = generate_modifiers(&ctx, selected, &mut self.rng);
        let timers = generate_timers(
            difficulty,
            selected.map_or(0, |e| e.pressure),
            ctx.mistake_count(),
            mode,
            &mut self.rng,
        );

        let decision = Decision {
            event: selected.cloned(),
            day,
            difficulty,
            mode,
            intended_mode: intended,
            modifiers,
            timers,
            map_notes: collect_modifier_notes(&input.active_map_modifiers),
        };

        log::debug!(
            "Day {} [{}] intended {} → {} {}",
            day,
            difficulty,
            intended,
            mode,
            decision
                .event
                .as_ref()
                .map_or("<none>", |e| e.id.as_str())
        );

        self.runtime.last_decision = Some(decision.clone());
        self.runtime.last_context = Some(ctx);
        self.runtime.last_intended_mode = Some(intended);
        self.runtime.last_candidates = candidates;
        decision
    }

    /// Snapshot director internals; `Toggle` also flips the overlay flag.
    pub fn debug(&mut self, action: DebugAction) -> DebugSnapshot {
        if action == DebugAction::Toggle {
            self.runtime.debug_enabled = !self.runtime.debug_enabled;
            log::info!(
                "Director debug overlay {}",
                if self.runtime.debug_enabled { "enabled" } else { "disabled" }
            );
        }

        let mut candidates = self.runtime.last_candidates.clone();
        candidates.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        DebugSnapshot {
            enabled: self.runtime.debug_enabled,
            counts: self.runtime.counts,
            distribution: ModeDistribution::from_counts(&self.runtime.counts, &TARGET_DISTRIBUTION),
            last_decision: self.runtime.last_decision.clone(),
            last_context: self.runtime.last_context.clone(),
            intended_mode: self.runtime.last_intended_mode,
            candidates,
        }
    }
}
