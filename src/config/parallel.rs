//! Parallelism configuration for batch checks.
//!
//! Files of a batch are checked concurrently on a rayon thread pool sized
//! from this configuration.

use serde::{Deserialize, Serialize};

/// Batches run in parallel unless configured otherwise.
fn default_enabled() -> bool {
    true
}

/// `[parallel]` section of `.pycomply.toml`.
///
/// # Example
///
/// ```rust
/// use pycomply::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(4),
/// };
/// assert_eq!(config.effective_concurrency(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Check files on several workers (default: true). Reports are the
    /// same either way.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker count; unset means one per core
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    /// Single worker, files in input order.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Workers the batch pool is built with.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(num_cpus)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
