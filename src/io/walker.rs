use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Discovers Python files under a set of roots, honoring `.gitignore`.
pub struct FileWalker {
    roots: Vec<PathBuf>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.ignore_patterns = patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern: {}", pattern))
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Matching files, sorted and without duplicates.
    ///
    /// A root that is itself a file is taken as is, whatever its extension.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in &self.roots {
            if root.is_file() {
                if !self.is_excluded(root) {
                    files.push(root.clone());
                }
                continue;
            }

            let walker = WalkBuilder::new(root).hidden(true).git_ignore(true).build();
            for entry in walker {
                let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
                let path = entry.path();
                if path.is_file() && self.should_process(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let is_python = path
            .extension()
            .map(|ext| PYTHON_EXTENSIONS.contains(&ext.to_string_lossy().as_ref()))
            .unwrap_or(false);
        is_python && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(&path_str))
    }
}

pub fn find_python_files(roots: &[PathBuf], exclude: &[String]) -> Result<Vec<PathBuf>> {
    FileWalker::new(roots.to_vec())
        .with_ignore_patterns(exclude)?
        .walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn temp_dir() -> TempDir {
        tempfile::Builder::new().prefix("walk").tempdir().unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_finds_only_python_files() {
        let temp = temp_dir();
        touch(temp.path(), "pkg/a.py");
        touch(temp.path(), "pkg/b.pyi");
        touch(temp.path(), "pkg/readme.md");
        touch(temp.path(), "tests/test_a.py");

        let files = find_python_files(&[temp.path().to_path_buf()], &[]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(temp.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pkg/a.py", "pkg/b.pyi", "tests/test_a.py"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp = temp_dir();
        touch(temp.path(), "pkg/a.py");
        touch(temp.path(), "tests/test_a.py");

        let files =
            find_python_files(&[temp.path().to_path_buf()], &["**/tests/**".to_string()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("pkg/a.py"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(FileWalker::new(vec![]).with_ignore_patterns(&["[".to_string()]).is_err());
    }
}
