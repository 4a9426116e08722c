use crate::cli::OutputFormat;
use crate::config::{load_config, ComplianceConfig};
use crate::coverage::parse_lcov_file;
use crate::io::output::create_writer;
use crate::io::{self, walker};
use crate::pipeline::{check_batch, CancellationToken, CoverageLookup, NoCoverage, SourceInput};
use crate::report::{BatchReport, ExitSignal};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Options of the `check` command
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub paths: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub coverage_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub max_complexity: Option<i64>,
    pub min_coverage: Option<f64>,
    pub exclude: Vec<String>,
    pub disable: Vec<String>,
    pub verbosity: u8,
}

/// Run the checks and render the batch; the returned signal decides the
/// exit code.
pub fn check_project(options: CheckConfig) -> Result<ExitSignal> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = load_config(options.config.as_deref(), &cwd)?;
    let config = apply_overrides(config, &options);

    let files = walker::find_python_files(&options.paths, &options.exclude)?;
    if files.is_empty() {
        tracing::warn!("No Python files found under the given paths");
    }
    let inputs = read_inputs(&files)?;

    let lcov;
    let coverage: &dyn CoverageLookup = match &options.coverage_file {
        Some(path) => {
            lcov = parse_lcov_file(path)?;
            &lcov
        }
        None => &NoCoverage,
    };

    let batch = check_batch(&inputs, coverage, &config, &CancellationToken::new())?;
    write_output(&batch, &options)?;
    Ok(batch.exit)
}

/// Command line flags take precedence over the configuration file.
fn apply_overrides(mut config: ComplianceConfig, options: &CheckConfig) -> ComplianceConfig {
    if let Some(max) = options.max_complexity {
        config.complexity.max = max;
    }
    if let Some(ratio) = options.min_coverage {
        config.coverage.min_ratio = ratio;
    }
    // `--jobs` sizes the pool; it never re-enables a sequential config.
    if let Some(jobs) = options.jobs {
        config.parallel.max_concurrency = (jobs > 0).then_some(jobs);
    }
    config.rules.disabled.extend(options.disable.iter().cloned());
    config
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<SourceInput>> {
    files
        .iter()
        .map(|path| {
            let text = io::read_file(path)?;
            Ok(SourceInput::new(display_path(path), text))
        })
        .collect()
}

fn display_path(path: &Path) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.to_string_lossy().into_owned()
}

fn write_output(batch: &BatchReport, options: &CheckConfig) -> Result<()> {
    if options.output.is_some() {
        colored::control::set_override(false);
    }
    let mut buffer = Vec::new();
    create_writer(options.format.into(), &mut buffer, options.verbosity > 0).write_batch(batch)?;

    match &options.output {
        Some(path) => io::write_file(path, &String::from_utf8_lossy(&buffer)),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(&buffer)
                .context("Failed to write report to stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;

    fn options() -> CheckConfig {
        CheckConfig {
            paths: vec![],
            config: None,
            coverage_file: None,
            format: OutputFormat::Terminal,
            output: None,
            jobs: Some(2),
            max_complexity: Some(7),
            min_coverage: None,
            exclude: vec![],
            disable: vec!["design".to_string()],
            verbosity: 0,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = apply_overrides(ComplianceConfig::default(), &options());
        assert_eq!(config.complexity.max, 7);
        assert_eq!(config.coverage.min_ratio, 0.8);
        assert_eq!(config.parallel.effective_concurrency(), 2);
        assert_eq!(config.rules.disabled, vec!["design"]);
    }

    #[test]
    fn test_jobs_flag_keeps_sequential_config() {
        let config = ComplianceConfig {
            parallel: ParallelConfig::sequential(),
            ..Default::default()
        };
        let config = apply_overrides(config, &options());
        assert!(!config.parallel.enabled);
        assert_eq!(config.parallel.max_concurrency, Some(2));
        assert_eq!(config.parallel.effective_concurrency(), 1);

        let all_cores = CheckConfig {
            jobs: Some(0),
            ..options()
        };
        let config = apply_overrides(ComplianceConfig::default(), &all_cores);
        assert!(config.parallel.enabled);
        assert_eq!(config.parallel.max_concurrency, None);
    }

    #[test]
    fn test_display_path_drops_leading_dot() {
        assert_eq!(display_path(Path::new("./pkg/a.py")), "pkg/a.py");
        assert_eq!(display_path(Path::new("pkg/a.py")), "pkg/a.py");
    }
}
