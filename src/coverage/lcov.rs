use crate::core::{Error, Result};
use crate::pipeline::CoverageLookup;
use crate::rules::CoverageMap;
use lcov::{Reader, Record};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Line execution data per source file of an LCOV report.
#[derive(Debug, Clone, Default)]
pub struct LcovData {
    files: HashMap<PathBuf, CoverageMap>,
}

impl LcovData {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Coverage for `file`, matching relative and absolute spellings of the
    /// same path.
    pub fn get(&self, file: &Path) -> Option<&CoverageMap> {
        self.files
            .get(file)
            .or_else(|| {
                let normalized = normalize_path(file);
                self.find(|lcov_path| normalized.ends_with(normalize_path(lcov_path)))
                    .or_else(|| self.find(|lcov_path| lcov_path.ends_with(&normalized)))
            })
    }

    fn find(&self, matches: impl Fn(&Path) -> bool) -> Option<&CoverageMap> {
        // Sorted so that ambiguous suffix matches resolve the same way every run.
        let mut candidates: Vec<(&PathBuf, &CoverageMap)> = self
            .files
            .iter()
            .filter(|(path, _)| matches(path))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));
        candidates.first().map(|(_, map)| *map)
    }
}

impl CoverageLookup for LcovData {
    fn coverage_for(&self, file: &str) -> Option<&CoverageMap> {
        self.get(Path::new(file))
    }
}

/// Read an LCOV tracefile from disk.
pub fn parse_lcov_file(path: &Path) -> Result<LcovData> {
    let reader = Reader::open_file(path)
        .map_err(|e| Error::file_system("Failed to open LCOV file", path, e))?;
    let data = collect_records(reader)?;
    tracing::debug!(
        "Loaded coverage for {} files from {}",
        data.file_count(),
        path.display()
    );
    Ok(data)
}

/// Parse LCOV tracefile contents.
pub fn parse_lcov_str(contents: &str) -> Result<LcovData> {
    collect_records(Reader::new(contents.as_bytes()))
}

fn collect_records<B: BufRead>(reader: Reader<B>) -> Result<LcovData> {
    let mut data = LcovData::default();
    let mut current_file: Option<PathBuf> = None;

    for record in reader {
        let record =
            record.map_err(|e| Error::Coverage(format!("Failed to parse LCOV record: {}", e)))?;

        match record {
            Record::SourceFile { path } => {
                current_file = Some(path);
            }
            Record::LineData { line, count, .. } => {
                let Some(file) = current_file.as_ref() else {
                    return Err(Error::Coverage(format!(
                        "line data for line {} outside of a source file record",
                        line
                    )));
                };
                // A line run by any test case counts as executed.
                let executed = data
                    .files
                    .entry(file.clone())
                    .or_default()
                    .entry(line as usize)
                    .or_insert(false);
                *executed |= count > 0;
            }
            Record::EndOfRecord => {
                current_file = None;
            }
            _ => {}
        }
    }

    Ok(data)
}

/// Normalize a path by removing a leading `./`
fn normalize_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let cleaned = path_str.strip_prefix("./").unwrap_or(&path_str);
    PathBuf::from(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRACEFILE: &str = indoc! {"
        TN:
        SF:/work/project/pkg/orders.py
        DA:1,1
        DA:2,0
        DA:3,4
        LF:3
        LH:2
        end_of_record
        TN:second
        SF:/work/project/pkg/orders.py
        DA:2,1
        end_of_record
        SF:./pkg/util.py
        DA:1,0
        end_of_record
    "};

    #[test]
    fn test_hit_counts_become_executed_flags() {
        let data = parse_lcov_str(TRACEFILE).unwrap();
        let map = data.get(Path::new("/work/project/pkg/orders.py")).unwrap();
        assert_eq!(map.get(&1), Some(&true));
        assert_eq!(map.get(&2), Some(&true));
        assert_eq!(map.get(&3), Some(&true));
        assert_eq!(map.get(&4), None);
    }

    #[test]
    fn test_relative_and_absolute_paths_match() {
        let data = parse_lcov_str(TRACEFILE).unwrap();
        assert!(data.coverage_for("pkg/orders.py").is_some());
        assert!(data.coverage_for("./pkg/orders.py").is_some());
        assert!(data.coverage_for("pkg/util.py").is_some());
        assert!(data.coverage_for("/elsewhere/pkg/util.py").is_some());
        assert!(data.coverage_for("pkg/missing.py").is_none());
    }

    #[test]
    fn test_parse_lcov_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(TRACEFILE.as_bytes()).unwrap();
        let data = parse_lcov_file(temp_file.path()).unwrap();
        assert_eq!(data.file_count(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = parse_lcov_file(Path::new("/definitely/not/here.info"));
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }
}
