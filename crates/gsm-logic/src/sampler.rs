//! Weighted sampling over an ordered set of (value, weight) pairs.
//!
//! ```
//! use gsm_logic::rng::SeededRng;
//! use gsm_logic::sampler::{weighted_sample, WeightedItem};
//!
//! let items = vec![WeightedItem::new("a", 1.0), WeightedItem::new("b", 3.0)];
//! let mut rng = SeededRng::new(1);
//! let picked = weighted_sample(&items, &mut rng).unwrap();
//! assert!(*picked == "a" || *picked == "b");
//! ```

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// A value paired with a non-negative selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem<T> {
    pub value: T,
    pub weight: f64,
}

impl<T> WeightedItem<T> {
    pub fn new(value: T, weight: f64) -> Self {
        Self { value, weight }
    }

    /// Weight as used for sampling: negatives and NaN count as zero.
    fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Sampling failure. Both variants mean the caller handed in an invalid set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// Nothing to sample from.
    Empty,
    /// Every weight was zero or negative.
    ZeroTotalWeight,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Empty => write!(f, "Cannot sample from an empty collection"),
            SampleError::ZeroTotalWeight => write!(f, "Cannot sample when all weights are zero"),
        }
    }
}

impl std::error::Error for SampleError {}

/// Pick one value using a single draw from `rng`.
///
/// Walks the items accumulating weight and returns the first whose
/// cumulative weight reaches `draw * total`. If rounding pushes the
/// threshold past the final sum, the last item is returned.
pub fn weighted_sample<'a, T, R>(
    items: &'a [WeightedItem<T>],
    rng: &mut R,
) -> Result<&'a T, SampleError>
where
    R: RandomSource + ?Sized,
{
    let last = items.last().ok_or(SampleError::Empty)?;

    let total: f64 = items.iter().map(WeightedItem::effective_weight).sum();
    if total <= 0.0 {
        return Err(SampleError::ZeroTotalWeight);
    }

    let threshold = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for item in items {
        cumulative += item.effective_weight();
        if threshold <= cumulative {
            return Ok(&item.value);
        }
    }

    Ok(&last.value)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Replays a fixed list of draws, cycling when exhausted.
    pub(crate) struct ScriptedDraws {
        values: Vec<f64>,
        index: usize,
    }

    impl ScriptedDraws {
        pub(crate) fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                index: 0,
            }
        }
    }

    impl RandomSource for ScriptedDraws {
        fn next_f64(&mut self) -> f64 {
            let v = self.values[self.index % self.values.len()];
            self.index += 1;
            v
        }
    }

    #[test]
    fn empty_input_fails() {
        let items: Vec<WeightedItem<&str>> = Vec::new();
        let mut rng = ScriptedDraws::new(&[0.5]);
        assert_eq!(weighted_sample(&items, &mut rng), Err(SampleError::Empty));
    }

    #[test]
    fn all_zero_weights_fail() {
        let items = vec![WeightedItem::new("x", 0.0)];
        let mut rng = ScriptedDraws::new(&[0.5]);
        assert_eq!(
            weighted_sample(&items, &mut rng),
            Err(SampleError::ZeroTotalWeight)
        );
    }

    #[test]
    fn negative_weights_count_as_zero() {
        let items = vec![WeightedItem::new("neg", -5.0), WeightedItem::new("pos", 1.0)];
        for draw in [0.0, 0.3, 0.99] {
            let mut rng = ScriptedDraws::new(&[draw]);
            // A zero draw lands on the first item since 0 <= 0.
            let expected = if draw == 0.0 { "neg" } else { "pos" };
            assert_eq!(*weighted_sample(&items, &mut rng).unwrap(), expected);
        }

        let all_negative = vec![WeightedItem::new("a", -1.0), WeightedItem::new("b", -2.0)];
        let mut rng = ScriptedDraws::new(&[0.5]);
        assert_eq!(
            weighted_sample(&all_negative, &mut rng),
            Err(SampleError::ZeroTotalWeight)
        );
    }

    #[test]
    fn threshold_walks_cumulative_weight() {
        let items = vec![
            WeightedItem::new("a", 1.0),
            WeightedItem::new("b", 2.0),
            WeightedItem::new("c", 1.0),
        ];
        // total = 4 → thresholds: a ≤ 1, b ≤ 3, c ≤ 4
        let cases = [(0.1, "a"), (0.25, "a"), (0.26, "b"), (0.75, "b"), (0.76, "c")];
        for (draw, expected) in cases {
            let mut rng = ScriptedDraws::new(&[draw]);
            assert_eq!(*weighted_sample(&items, &mut rng).unwrap(), expected, "draw {draw}");
        }
    }

    #[test]
    fn overshoot_falls_back_to_last() {
        let items = vec![WeightedItem::new(1, 0.5), WeightedItem::new(2, 0.5)];
        let mut rng = ScriptedDraws::new(&[1.0 + 1e-9]);
        assert_eq!(*weighted_sample(&items, &mut rng).unwrap(), 2);
    }

    #[test]
    fn uses_exactly_one_draw() {
        let items = vec![WeightedItem::new('a', 1.0), WeightedItem::new('b', 1.0)];
        let mut rng = ScriptedDraws::new(&[0.1, 0.9]);
        assert_eq!(*weighted_sample(&items, &mut rng).unwrap(), 'a');
        assert_eq!(*weighted_sample(&items, &mut rng).unwrap(), 'b');
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            SampleError::Empty.to_string(),
            "Cannot sample from an empty collection"
        );
        assert_eq!(
            SampleError::ZeroTotalWeight.to_string(),
            "Cannot sample when all weights are zero"
        );
    }
}
