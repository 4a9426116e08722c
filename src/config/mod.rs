//! Threshold configuration.
//!
//! The engine only ever sees a [`ComplianceConfig`] value. Reading it from
//! `.pycomply.toml` is the loader's job and happens at the edges.

mod core;
pub mod loader;
mod parallel;
mod thresholds;

pub use self::core::{ComplianceConfig, RuleSelection};
pub use loader::{discover_config, load_config, parse_config, CONFIG_FILE_NAME};
pub use parallel::ParallelConfig;
pub use thresholds::{
    ComplexityThresholds, CoverageThresholds, DesignThresholds, DocThresholds, StyleThresholds,
};
