use std::fs;
use std::path::{Path, PathBuf};

use super::core::ComplianceConfig;
use crate::core::{Error, Result};

/// Name of the configuration file searched for in the directory hierarchy
pub const CONFIG_FILE_NAME: &str = ".pycomply.toml";

/// Directories searched upward from the starting point
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse config from a TOML string
pub fn parse_config(contents: &str) -> Result<ComplianceConfig> {
    Ok(toml::from_str::<ComplianceConfig>(contents)?)
}

/// Read and parse a configuration file that must exist
pub fn load_config_from_path(path: &Path) -> Result<ComplianceConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::file_system("Failed to read config file", path, e))?;
    let config = parse_config(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the closest `.pycomply.toml` at or above `start`
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Resolve the effective configuration.
///
/// An explicit path must exist and parse. Without one, the closest
/// `.pycomply.toml` above `start` is used, and defaults apply when none is
/// found.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<ComplianceConfig> {
    if let Some(path) = explicit {
        return load_config_from_path(path);
    }

    match discover_config(start) {
        Some(path) => load_config_from_path(&path),
        None => {
            tracing::debug!(
                "No {} found after checking {} directories. Using default config.",
                CONFIG_FILE_NAME,
                MAX_TRAVERSAL_DEPTH
            );
            Ok(ComplianceConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_ancestors_respects_depth() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c/d"), 3).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c/d"),
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
            ]
        );
    }

    #[test]
    fn test_discovers_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("pkg").join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[complexity]\nmax = 7\n").unwrap();

        let config = load_config(None, &nested).unwrap();
        assert_eq!(config.complexity.max, 7);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = load_config(Some(&temp.path().join("nope.toml")), temp.path());
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(parse_config("[doc\nmin_length = "), Err(Error::Toml(_))));
    }
}
