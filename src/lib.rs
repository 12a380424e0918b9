//! Weighted, index-keyed partitioning of ordered datasets.
//!
//! ```
//! use data_partitioner::{assign, DataSplitter, LinearSource};
//!
//! let source = LinearSource::new(10).unwrap();
//! let buckets = assign(10, &[1.0, 1.0, 2.0], source).unwrap();
//! assert_eq!(buckets, vec![0, 0, 0, 1, 1, 2, 2, 2, 2, 2]);
//!
//! let splitter = DataSplitter::builder(vec!["a", "b", "c", "d"])
//!     .partitioning_function(|i| i % 2)
//!     .build()
//!     .unwrap();
//! let test: Vec<_> = splitter.test_set().unwrap().collect();
//! assert_eq!(test, vec![(1, &"b"), (3, &"d")]);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod partitioner;
pub mod random_source;
pub mod splitter;

pub use config::SplitConfig;
pub use dataset::Dataset;
pub use error::{PartitionError, PartitionResult};
pub use partitioner::{assign, partitions, Partitions, Thresholds};
pub use random_source::{LinearSource, RandomSource, SeededSource, UniformSource};
pub use splitter::{DataSplitter, Split, SplitIter, SplitterBuilder};
