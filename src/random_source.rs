//! Sources of the values that decide bucket membership.
//!
//! A [`RandomSource`] maps a dataset index to a value in `[0, 1)`. The
//! partitioner only ever asks for `sample(index)`, so deterministic and
//! stochastic behaviour are swapped by choosing a different source.

use std::cell::RefCell;

use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{PartitionError, PartitionResult};

pub trait RandomSource {
    /// Returns the value in `[0, 1)` used to place `index` into a bucket.
    fn sample(&self, index: usize) -> PartitionResult<f64>;
}

impl<S: RandomSource + ?Sized> RandomSource for &S {
    fn sample(&self, index: usize) -> PartitionResult<f64> {
        (**self).sample(index)
    }
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn sample(&self, index: usize) -> PartitionResult<f64> {
        (**self).sample(index)
    }
}

/// Deterministic ramp `index / limit`, defined for `index` in `0..limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearSource {
    limit: usize,
}

impl LinearSource {
    pub fn new(limit: usize) -> PartitionResult<Self> {
        if limit == 0 {
            return Err(PartitionError::invalid("linear source limit must be positive"));
        }

        Ok(LinearSource { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl RandomSource for LinearSource {
    fn sample(&self, index: usize) -> PartitionResult<f64> {
        if index >= self.limit {
            return Err(PartitionError::invalid(format!(
                "index {} is out of range for linear source with limit {}",
                index, self.limit
            )));
        }

        Ok(index as f64 / self.limit as f64)
    }
}

/// Independent uniform draws from an injected generator.
///
/// The index is ignored: two calls with the same index return two independent
/// values. Defaults to the thread-local generator.
#[derive(Debug)]
pub struct UniformSource<R = ThreadRng> {
    rng: RefCell<R>,
}

impl UniformSource {
    pub fn new() -> Self {
        UniformSource::from_rng(rand::rng())
    }
}

impl Default for UniformSource {
    fn default() -> Self {
        UniformSource::new()
    }
}

impl<R: Rng> UniformSource<R> {
    pub fn from_rng(rng: R) -> Self {
        UniformSource {
            rng: RefCell::new(rng),
        }
    }
}

impl<R: Rng> RandomSource for UniformSource<R> {
    fn sample(&self, _index: usize) -> PartitionResult<f64> {
        Ok(self.rng.borrow_mut().random::<f64>())
    }
}

/// Reproducible source: the value for an index depends only on the seed and
/// the index, never on the order of calls.
#[derive(Debug, Clone)]
pub struct SeededSource {
    seed: u64,
    rng: ChaCha8Rng,
}

// One f64 draw consumes a u64, i.e. two 32-bit keystream words.
const WORDS_PER_SAMPLE: u128 = 2;

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        SeededSource {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededSource {
    fn sample(&self, index: usize) -> PartitionResult<f64> {
        let mut rng = self.rng.clone();
        rng.set_word_pos(index as u128 * WORDS_PER_SAMPLE);
        Ok(rng.random::<f64>())
    }
}
