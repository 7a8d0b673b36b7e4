//! Seeded, reproducible randomness.
//!
//! All randomness in the director flows through a [`SeededRng`] owned by a
//! single [`RngController`]. The generator is the Park–Miller "minimal
//! standard" linear congruential generator:
//!
//! ```text
//! state = (48271 * state) mod (2^31 - 1)
//! value = state / (2^31 - 1)
//! ```
//!
//! The recurrence is fixed so that the same seed produces the same stream
//! across runs and across the browser and native builds of the game.
//!
//! ```
//! use gsm_logic::rng::SeededRng;
//!
//! let mut a = SeededRng::new(7);
//! let mut b = SeededRng::new(7);
//! assert_eq!(a.next_f64(), b.next_f64());
//! ```

use crate::sampler::SampleError;

/// Modulus of the Park–Miller generator (2^31 - 1).
pub const MODULUS: i64 = 0x7fff_ffff;

/// Multiplier of the Park–Miller generator.
pub const MULTIPLIER: i64 = 48_271;

/// Largest integer exactly representable in an f64 (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Anything that can hand out uniform draws in `[0, 1)`.
///
/// The sampler, scorer, and rule modules take this instead of a concrete
/// generator so tests can feed scripted draws.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Park–Miller generator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    /// Create a generator from an integer seed.
    ///
    /// Non-positive seeds are folded into the valid state range
    /// `1..MODULUS`; a state of zero would lock the stream at zero.
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        Self {
            state: state.max(1),
        }
    }

    fn advance(&mut self) -> i64 {
        self.state = (MULTIPLIER * self.state) % MODULUS;
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.advance() as f64 / MODULUS as f64
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        SeededRng::next_f64(self)
    }
}

impl rand::RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        (SeededRng::next_f64(self) * 4_294_967_296.0) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Result of a d100 skill check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillCheck {
    pub passed: bool,
    pub total: i64,
}

/// Owns a seeded stream and remembers enough of it to fork child streams.
#[derive(Debug, Clone)]
pub struct RngController {
    seed: i64,
    generator: SeededRng,
    current_seed: i64,
}

impl RngController {
    pub fn new(seed: i64) -> Self {
        Self {
            seed,
            generator: SeededRng::new(seed),
            current_seed: seed,
        }
    }

    /// Seed the controller was created with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Advance the stream and return the next value in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        let value = self.generator.next_f64();
        self.current_seed = (value * MAX_SAFE_INTEGER).floor() as i64;
        value
    }

    /// Independent child controller seeded from the current position plus `salt`.
    ///
    /// Forking does not advance this controller.
    pub fn fork(&self, salt: i64) -> RngController {
        RngController::new(self.current_seed.wrapping_add(salt))
    }

    /// Uniform integer in `0..max` (0 when `max` is 0).
    pub fn random_int(&mut self, max: usize) -> usize {
        let value = (self.next() * max as f64).floor() as usize;
        value.min(max.saturating_sub(1))
    }

    /// Pick one item uniformly.
    pub fn sample<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, SampleError> {
        if items.is_empty() {
            return Err(SampleError::Empty);
        }
        let index = self.random_int(items.len());
        Ok(&items[index])
    }

    /// Fisher–Yates shuffle into a new vector.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut result = items.to_vec();
        for i in (1..result.len()).rev() {
            let j = self.random_int(i + 1);
            result.swap(i, j);
        }
        result
    }

    /// Roll 1–100, add `modifier`, and compare against `difficulty`.
    pub fn roll_skill_check(&mut self, modifier: i64, difficulty: i64) -> SkillCheck {
        let roll = (self.next() * 100.0).floor() as i64 + 1;
        let total = roll + modifier;
        SkillCheck {
            passed: total >= difficulty,
            total,
        }
    }
}

impl RandomSource for RngController {
    fn next_f64(&mut self) -> f64 {
        self.next()
    }
}
