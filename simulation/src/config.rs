//! Workload configuration
//!
//! Settings for the workload runners. Every field has a default, so a JSON
//! file only needs to name what it changes:
//!
//! ```json
//! { "regions": [175, 100, 180, 150], "writes": 1000 }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Seed used when none is given, so default runs are reproducible
pub const DEFAULT_SEED: u64 = 1622589983;

/// Configuration for the string and ring workloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Storage region sizes in list order
    pub regions: Vec<usize>,

    /// Random writes (or ring round trips) after the fixed strings
    pub writes: usize,

    /// Seed for the workload RNG
    pub seed: u64,

    /// Upper bound on scatter entries per write, and on regions for
    /// the ring workload
    pub max_scatter_entries: usize,

    /// Walk the whole log after every write
    pub check_integrity: bool,

    /// Hexdump every region when the run ends
    pub dump: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            regions: vec![1235],
            writes: 100,
            seed: DEFAULT_SEED,
            max_scatter_entries: 20,
            check_integrity: true,
            dump: false,
        }
    }
}

impl WorkloadConfig {
    /// Small single-region buffer that overflows after a few writes
    pub fn tiny() -> Self {
        Self {
            regions: vec![256],
            writes: 500,
            ..Default::default()
        }
    }

    /// Four uneven regions
    pub fn fragmented() -> Self {
        Self {
            regions: vec![175, 100, 180, 150],
            writes: 1000,
            ..Default::default()
        }
    }

    /// Many awkward regions and a long run
    pub fn stress() -> Self {
        Self {
            regions: vec![512, 37, 1024, 3, 700, 1, 256, 4096],
            writes: 10_000,
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid workload configuration")
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Bytes of backing storage the regions need
    pub fn total_size(&self) -> usize {
        self.regions.iter().sum()
    }
}
