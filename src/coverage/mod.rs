//! Coverage data sources.
//!
//! The engine consumes a precomputed [`CoverageMap`] per file; this module
//! turns external coverage reports into those maps.

pub mod lcov;

pub use self::lcov::{parse_lcov_file, parse_lcov_str, LcovData};
pub use crate::rules::CoverageMap;
