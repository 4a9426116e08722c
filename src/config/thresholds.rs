use crate::core::ConfigError;
use serde::{Deserialize, Serialize};

/// Documentation rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocThresholds {
    /// Minimum trimmed docstring length in characters (default: 10)
    #[serde(default = "default_min_doc_length")]
    pub min_length: usize,

    /// Require every parameter to be mentioned in the docstring (default: false)
    #[serde(default)]
    pub require_params: bool,

    /// Check the module docstring as well (default: false)
    #[serde(default)]
    pub require_module: bool,
}

impl Default for DocThresholds {
    fn default() -> Self {
        Self {
            min_length: default_min_doc_length(),
            require_params: false,
            require_module: false,
        }
    }
}

/// Style rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleThresholds {
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    #[serde(default = "default_function_pattern")]
    pub function_pattern: String,

    #[serde(default = "default_class_pattern")]
    pub class_pattern: String,

    #[serde(default = "default_variable_pattern")]
    pub variable_pattern: String,

    /// Check import placement, ordering and unused imports
    #[serde(default = "default_true")]
    pub check_imports: bool,
}

impl Default for StyleThresholds {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            function_pattern: default_function_pattern(),
            class_pattern: default_class_pattern(),
            variable_pattern: default_variable_pattern(),
            check_imports: true,
        }
    }
}

impl StyleThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == 0 {
            return Err(ConfigError::new(
                "style.max_line_length",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Cyclomatic complexity threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplexityThresholds {
    /// Highest accepted score; anything above is reported (default: 20)
    #[serde(default = "default_max_complexity")]
    pub max: i64,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            max: default_max_complexity(),
        }
    }
}

impl ComplexityThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max <= 0 {
            return Err(ConfigError::new(
                "complexity.max",
                format!("must be a positive integer, got {}", self.max),
            ));
        }
        Ok(())
    }
}

/// Coverage ratio threshold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageThresholds {
    /// Minimum executed/own-lines ratio in `[0, 1]` (default: 0.8)
    #[serde(default = "default_min_coverage_ratio")]
    pub min_ratio: f64,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            min_ratio: default_min_coverage_ratio(),
        }
    }
}

impl CoverageThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_ratio) {
            return Err(ConfigError::new(
                "coverage.min_ratio",
                format!("must be within [0, 1], got {}", self.min_ratio),
            ));
        }
        Ok(())
    }
}

/// Debug leftovers the design rule looks for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignThresholds {
    #[serde(default = "default_true")]
    pub forbid_print: bool,

    #[serde(default = "default_debug_modules")]
    pub debug_modules: Vec<String>,
}

impl Default for DesignThresholds {
    fn default() -> Self {
        Self {
            forbid_print: true,
            debug_modules: default_debug_modules(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_min_doc_length() -> usize {
    10
}
fn default_max_line_length() -> usize {
    120
}
fn default_function_pattern() -> String {
    "^_{0,2}[a-z][a-z0-9_]*_{0,2}$".to_string()
}
fn default_class_pattern() -> String {
    "^_?[A-Z][a-zA-Z0-9]*$".to_string()
}
fn default_variable_pattern() -> String {
    "^(_|_{0,2}([a-z][a-z0-9_]*|[A-Z][A-Z0-9_]*))$".to_string()
}
fn default_max_complexity() -> i64 {
    20
}
fn default_min_coverage_ratio() -> f64 {
    0.8
}
fn default_debug_modules() -> Vec<String> {
    vec!["pdb".to_string(), "ipdb".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        assert_eq!(DocThresholds::default().min_length, 10);
        assert_eq!(StyleThresholds::default().max_line_length, 120);
        assert_eq!(ComplexityThresholds::default().max, 20);
        assert_eq!(CoverageThresholds::default().min_ratio, 0.8);
        assert_eq!(DesignThresholds::default().debug_modules, vec!["pdb", "ipdb"]);
    }

    #[test]
    fn test_non_positive_complexity_rejected() {
        for max in [0, -3] {
            let err = ComplexityThresholds { max }.validate().unwrap_err();
            assert_eq!(err.field, "complexity.max");
        }
        assert!(ComplexityThresholds { max: 1 }.validate().is_ok());
    }

    #[test]
    fn test_coverage_ratio_bounds() {
        assert!(CoverageThresholds { min_ratio: 1.5 }.validate().is_err());
        assert!(CoverageThresholds { min_ratio: -0.1 }.validate().is_err());
        assert!(CoverageThresholds { min_ratio: 0.0 }.validate().is_ok());
        assert!(CoverageThresholds { min_ratio: 1.0 }.validate().is_ok());
    }

    #[test]
    fn test_zero_line_length_rejected() {
        let style = StyleThresholds {
            max_line_length: 0,
            ..StyleThresholds::default()
        };
        assert!(style.validate().is_err());
    }
}
