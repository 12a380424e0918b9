use serde_derive::{Deserialize, Serialize};

use crate::error::{PartitionError, PartitionResult};

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Settings of a training/test split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Expected share of examples placed in the test set, in `(0, 1)`.
    pub test_fraction: f64,
    /// Makes the split reproducible across processes when set.
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: None,
        }
    }
}

impl SplitConfig {
    pub fn from_json(json: &str) -> PartitionResult<Self> {
        let config: SplitConfig = serde_json::from_str(json)
            .map_err(|e| PartitionError::invalid(format!("malformed split config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> PartitionResult<String> {
        serde_json::to_string(self)
            .map_err(|e| PartitionError::invalid(format!("unserializable split config: {}", e)))
    }

    pub fn validate(&self) -> PartitionResult<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PartitionError::invalid(format!(
                "test fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }

        Ok(())
    }

    /// Bucket weights: training first, test second.
    pub fn weights(&self) -> [f64; 2] {
        [1.0 - self.test_fraction, self.test_fraction]
    }
}
