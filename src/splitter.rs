//! Training/test views over a dataset.
//!
//! A [`DataSplitter`] assigns every example to either the training or the test
//! split. The assignment is computed once, on first access, and reused for
//! the lifetime of the splitter, so repeated calls to
//! [`DataSplitter::training_set`] and [`DataSplitter::test_set`] always agree
//! even when the underlying source is stochastic.

use std::cell::OnceCell;
use std::fmt;

use log::{debug, warn};

use crate::config::SplitConfig;
use crate::dataset::Dataset;
use crate::error::{PartitionError, PartitionResult};
use crate::partitioner::partitions;
use crate::random_source::{RandomSource, SeededSource, UniformSource};

pub const TRAINING_BUCKET: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Training,
    Test,
}

impl Split {
    /// Bucket 0 is training, every other bucket id is test.
    pub fn from_bucket(bucket: usize) -> Self {
        if bucket == TRAINING_BUCKET {
            Split::Training
        } else {
            Split::Test
        }
    }
}

type PartitioningFunction = Box<dyn Fn(usize) -> usize>;

enum Partitioning {
    Weighted(Box<dyn RandomSource>),
    Custom(PartitioningFunction),
}

impl fmt::Debug for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Partitioning::Weighted(_) => write!(f, "Weighted"),
            Partitioning::Custom(_) => write!(f, "Custom"),
        }
    }
}

pub struct SplitterBuilder<D> {
    dataset: D,
    config: SplitConfig,
    random_source: Option<Box<dyn RandomSource>>,
    partitioning_function: Option<PartitioningFunction>,
}

impl<D: Dataset> SplitterBuilder<D> {
    #[must_use]
    pub fn test_fraction(mut self, test_fraction: f64) -> Self {
        self.config.test_fraction = test_fraction;
        self
    }

    /// Applies every setting of `config`, replacing earlier ones.
    #[must_use]
    pub fn config(mut self, config: SplitConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn random_source<S: RandomSource + 'static>(mut self, source: S) -> Self {
        self.random_source = Some(Box::new(source));
        self
    }

    /// Replaces the weighted split with `f(index) -> bucket`.
    #[must_use]
    pub fn partitioning_function<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> usize + 'static,
    {
        self.partitioning_function = Some(Box::new(f));
        self
    }

    pub fn build(self) -> PartitionResult<DataSplitter<D>> {
        self.config.validate()?;

        let partitioning = match (self.partitioning_function, self.random_source) {
            (Some(f), source) => {
                if source.is_some() {
                    warn!("partitioning function set, ignoring the random source");
                }
                Partitioning::Custom(f)
            }
            (None, Some(source)) => Partitioning::Weighted(source),
            (None, None) => match self.config.seed {
                Some(seed) => Partitioning::Weighted(Box::new(SeededSource::new(seed))),
                None => Partitioning::Weighted(Box::new(UniformSource::new())),
            },
        };

        if let Partitioning::Weighted(_) = partitioning {
            if self.dataset.examples_count() == 0 {
                return Err(PartitionError::invalid("cannot split an empty dataset"));
            }
        }

        Ok(DataSplitter {
            dataset: self.dataset,
            config: self.config,
            partitioning,
            assignment: OnceCell::new(),
        })
    }
}

pub struct DataSplitter<D> {
    dataset: D,
    config: SplitConfig,
    partitioning: Partitioning,
    assignment: OnceCell<Vec<Split>>,
}

impl<D: Dataset> DataSplitter<D> {
    /// Random split with the default test fraction.
    pub fn new(dataset: D) -> PartitionResult<Self> {
        DataSplitter::builder(dataset).build()
    }

    pub fn builder(dataset: D) -> SplitterBuilder<D> {
        SplitterBuilder {
            dataset,
            config: SplitConfig::default(),
            random_source: None,
            partitioning_function: None,
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn test_fraction(&self) -> f64 {
        self.config.test_fraction
    }

    pub fn len(&self) -> usize {
        self.dataset.examples_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn training_set(&self) -> PartitionResult<SplitIter<'_, D>> {
        self.split_iter(Split::Training)
    }

    pub fn test_set(&self) -> PartitionResult<SplitIter<'_, D>> {
        self.split_iter(Split::Test)
    }

    /// Split of a single example, `None` past the end of the dataset.
    pub fn split_of(&self, index: usize) -> PartitionResult<Option<Split>> {
        Ok(self.assignment()?.get(index).copied())
    }

    fn split_iter(&self, split: Split) -> PartitionResult<SplitIter<'_, D>> {
        Ok(SplitIter {
            dataset: &self.dataset,
            assignment: self.assignment()?,
            split,
            next_index: 0,
        })
    }

    fn assignment(&self) -> PartitionResult<&[Split]> {
        if let Some(assignment) = self.assignment.get() {
            return Ok(assignment);
        }

        let computed = self.compute_assignment()?;
        Ok(self.assignment.get_or_init(|| computed))
    }

    fn compute_assignment(&self) -> PartitionResult<Vec<Split>> {
        let count = self.dataset.examples_count();
        let assignment: Vec<Split> = match &self.partitioning {
            Partitioning::Weighted(source) => partitions(count, &self.config.weights(), source)
                .map(|bucket| bucket.map(Split::from_bucket))
                .collect::<PartitionResult<_>>()?,
            Partitioning::Custom(f) => (0..count).map(|index| Split::from_bucket(f(index))).collect(),
        };

        let test_count = assignment.iter().filter(|&&split| split == Split::Test).count();
        debug!(
            "{:?} split of {} examples: {} training, {} test",
            self.partitioning,
            count,
            count - test_count,
            test_count
        );
        Ok(assignment)
    }
}

impl<D> fmt::Debug for DataSplitter<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DataSplitter")
            .field("config", &self.config)
            .field("partitioning", &self.partitioning)
            .field("computed", &self.assignment.get().is_some())
            .finish_non_exhaustive()
    }
}

/// `(index, example)` pairs of one split, in index order.
pub struct SplitIter<'a, D> {
    dataset: &'a D,
    assignment: &'a [Split],
    split: Split,
    next_index: usize,
}

impl<'a, D: Dataset> Iterator for SplitIter<'a, D> {
    type Item = (usize, &'a D::Example);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.assignment.len() {
            let index = self.next_index;
            self.next_index += 1;
            if self.assignment[index] == self.split {
                return Some((index, self.dataset.example(index)));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.assignment.len() - self.next_index))
    }
}
