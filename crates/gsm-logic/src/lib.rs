//! Pure scenario-director logic for GSM.
//!
//! This crate contains the content-selection engine that decides, each
//! simulated day, which scripted event a learner faces, at what difficulty,
//! with which contextual modifiers and time budgets. Everything here is
//! independent of any UI, storage, or content-pack fetching. Functions take
//! plain data and return results, making them unit-testable and portable
//! across the browser build, native tools, and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`context`] | Per-call plan input, mistake entries, mastery/meter normalization |
//! | [`difficulty`] | Difficulty levels, day-phase curve, adaptive step |
//! | [`director`] | The `Director` service: `plan_next` and debug snapshots |
//! | [`events`] | Event cards, meter impacts, mode classification |
//! | [`map_modifiers`] | Campaign map modifiers (event filters, outcome adjustments) |
//! | [`meters`] | Meter snapshot, outcome application and description |
//! | [`modes`] | Mode distribution controller (deficit scheduler) |
//! | [`modifiers`] | Contextual modifier label rules |
//! | [`pack`] | Content-pack JSON → `DirectorConfig` |
//! | [`rng`] | Seeded Park–Miller RNG and controller helpers |
//! | [`sampler`] | Weighted sampling over (value, weight) pairs |
//! | [`scorer`] | Multi-factor candidate weighting |
//! | [`timers`] | Response/review/boss-prep time budgets |

pub mod context;
pub mod difficulty;
pub mod director;
pub mod events;
pub mod map_modifiers;
pub mod meters;
pub mod modes;
pub mod modifiers;
pub mod pack;
pub mod rng;
pub mod sampler;
pub mod scorer;
pub mod timers;

pub use director::{Decision, Director, DirectorConfig};
