use std::iter::FusedIterator;

use log::debug;

use crate::error::{PartitionError, PartitionResult};
use crate::random_source::RandomSource;

/// Cumulative weight distribution used for inverse-CDF bucket lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    cumulative: Vec<f64>,
    // Last bucket with a non-zero weight, for values that rounding pushes
    // past the final threshold.
    fallback: usize,
}

impl Thresholds {
    pub fn new(weights: &[f64]) -> PartitionResult<Self> {
        if weights.is_empty() {
            return Err(PartitionError::invalid("at least one weight is required"));
        }

        if let Some((bucket, weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(PartitionError::invalid(format!(
                "weight {} of bucket {} is not a non-negative number",
                weight, bucket
            )));
        }

        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(PartitionError::invalid(format!(
                "weights must sum to a positive finite value, got {}",
                total
            )));
        }

        let mut running = 0.0_f64;
        let cumulative: Vec<f64> = weights
            .iter()
            .map(|weight| {
                running += *weight;
                running / total
            })
            .collect();
        let fallback = weights
            .iter()
            .rposition(|&weight| weight > 0.0)
            .unwrap_or(weights.len() - 1);

        debug!("cumulative thresholds {:?} for weights {:?}", cumulative, weights);
        Ok(Thresholds {
            cumulative,
            fallback,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.cumulative.len()
    }

    /// Smallest bucket whose threshold is strictly greater than `value`.
    ///
    /// A value lying exactly on a boundary belongs to the following bucket,
    /// so zero-weight buckets are never selected.
    pub fn bucket(&self, value: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&threshold| value < threshold)
            .unwrap_or(self.fallback)
    }
}

/// Lazily assigns each index in `0..n` to a bucket.
///
/// Arguments are validated when the first element is requested. Any error,
/// from validation or from the source, is yielded once and ends the sequence.
pub fn partitions<S: RandomSource>(n: usize, weights: &[f64], source: S) -> Partitions<S> {
    Partitions {
        n,
        weights: weights.to_vec(),
        source,
        thresholds: None,
        next_index: 0,
        exhausted: false,
    }
}

/// Eager form of [`partitions`], failing on the first error.
pub fn assign<S: RandomSource>(n: usize, weights: &[f64], source: S) -> PartitionResult<Vec<usize>> {
    partitions(n, weights, source).collect()
}

#[derive(Debug)]
pub struct Partitions<S> {
    n: usize,
    weights: Vec<f64>,
    source: S,
    thresholds: Option<Thresholds>,
    next_index: usize,
    exhausted: bool,
}

impl<S: RandomSource> Partitions<S> {
    fn advance(&mut self) -> Option<PartitionResult<usize>> {
        if self.thresholds.is_none() {
            if self.n == 0 {
                return Some(Err(PartitionError::invalid(
                    "number of elements must be positive",
                )));
            }

            match Thresholds::new(&self.weights) {
                Ok(thresholds) => self.thresholds = Some(thresholds),
                Err(e) => return Some(Err(e)),
            }
        }

        if self.next_index >= self.n {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        let thresholds = self.thresholds.as_ref()?;
        Some(self.source.sample(index).map(|value| thresholds.bucket(value)))
    }
}

impl<S: RandomSource> Iterator for Partitions<S> {
    type Item = PartitionResult<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let item = self.advance();
        if !matches!(item, Some(Ok(_))) {
            self.exhausted = true;
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }

        let remaining = self.n - self.next_index;
        match self.thresholds {
            Some(_) => (0, Some(remaining)),
            // Not validated yet: may still yield a single error.
            None => (0, Some(remaining.max(1))),
        }
    }
}

impl<S: RandomSource> FusedIterator for Partitions<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_source::{LinearSource, SeededSource, UniformSource};

    fn linear_split(weights: &[f64]) -> Vec<usize> {
        let source = LinearSource::new(10).unwrap();
        assign(10, weights, source).unwrap()
    }

    #[test]
    fn test_split_in_two() {
        assert_eq!(linear_split(&[1.0, 1.0]), vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_split_in_three() {
        assert_eq!(linear_split(&[1.0, 1.0, 1.0]), vec![0, 0, 0, 0, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_split_in_three_with_empty() {
        assert_eq!(linear_split(&[1.0, 0.0, 1.0]), vec![0, 0, 0, 0, 0, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_split_in_three_unequal() {
        assert_eq!(linear_split(&[1.0, 1.0, 2.0]), vec![0, 0, 0, 1, 1, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_boundary_goes_to_next_bucket() {
        let thresholds = Thresholds::new(&[1.0, 1.0]).unwrap();
        assert_eq!(thresholds.bucket(0.49), 0);
        assert_eq!(thresholds.bucket(0.5), 1);
        assert_eq!(thresholds.bucket_count(), 2);
    }

    #[test]
    fn test_trailing_zero_weight_is_never_selected() {
        let thresholds = Thresholds::new(&[1.0, 1.0, 0.0]).unwrap();
        assert_eq!(thresholds.bucket(0.999_999), 1);
        assert_eq!(thresholds.bucket(1.0), 1);
        assert_eq!(thresholds.bucket(f64::NAN), 1);
    }

    #[test]
    fn test_negative_weight() {
        let mut iter = partitions(10, &[-1.0, 1.0], UniformSource::new());
        assert!(matches!(iter.next(), Some(Err(PartitionError::InvalidArgument(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_non_finite_weight() {
        assert!(Thresholds::new(&[f64::NAN, 1.0]).is_err());
        assert!(Thresholds::new(&[f64::INFINITY, 1.0]).is_err());
        assert!(Thresholds::new(&[f64::MAX, f64::MAX]).is_err());
    }

    #[test]
    fn test_weight_sum_0() {
        let mut iter = partitions(10, &[0.0, 0.0], UniformSource::new());
        assert!(matches!(iter.next(), Some(Err(PartitionError::InvalidArgument(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_empty_weights() {
        assert!(assign(10, &[], UniformSource::new()).is_err());
    }

    #[test]
    fn test_non_positive_n_of_elements() {
        let mut iter = partitions(0, &[1.0, 1.0], UniformSource::new());
        assert!(matches!(iter.next(), Some(Err(PartitionError::InvalidArgument(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_source_error_ends_sequence() {
        let source = LinearSource::new(10).unwrap();
        let items: Vec<_> = partitions(12, &[1.0, 1.0], source).collect();
        assert_eq!(items.len(), 11);
        assert!(items[..10].iter().all(|item| item.is_ok()));
        assert!(items[10].is_err());
    }

    #[test]
    fn test_construction_is_lazy() {
        // Nothing is validated until the sequence is consumed.
        let iter = partitions(0, &[-1.0], UniformSource::new());
        assert_eq!(iter.size_hint(), (0, Some(1)));
    }

    #[test]
    fn test_weighted_proportions() {
        let n = 40_000;
        let buckets = assign(n, &[1.0, 1.0, 2.0], SeededSource::new(3)).unwrap();
        let mut counts = [0usize; 3];
        for bucket in buckets {
            counts[bucket] += 1;
        }

        let expected = [0.25, 0.25, 0.5];
        for (count, expected) in counts.iter().zip(expected.iter()) {
            let ratio = *count as f64 / n as f64;
            assert!(
                (ratio - expected).abs() < expected * 0.05,
                "ratio {} too far from {}",
                ratio,
                expected
            );
        }
    }

    #[test]
    fn test_seeded_partitions_are_reproducible() {
        let first = assign(500, &[0.3, 0.7], SeededSource::new(99)).unwrap();
        let second = assign(500, &[0.3, 0.7], SeededSource::new(99)).unwrap();
        assert_eq!(first, second);
    }
}
