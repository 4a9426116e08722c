use crate::core::{RuleFamily, Severity};
use crate::report::{BatchReport, Report, RuleStatus};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_batch(&mut self, batch: &BatchReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_batch(&mut self, batch: &BatchReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(batch)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Human readable output: one ✔/✘ line per file, its findings, then a
/// batch summary.
pub struct TerminalWriter<W: Write> {
    writer: W,
    verbose: bool,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also list passing files and per-family statuses.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn write_report(&mut self, report: &Report) -> anyhow::Result<()> {
        if report.verdict.is_pass() {
            if !self.verbose && report.findings.is_empty() {
                return Ok(());
            }
            writeln!(self.writer, "{} {}", "✔".green(), report.file)?;
        } else {
            writeln!(self.writer, "{} {}", "✘".red(), report.file.bold())?;
        }

        for finding in &report.findings {
            let severity = match finding.severity {
                Severity::Error => "error".red(),
                Severity::Warning => "warning".yellow(),
                Severity::Info => "info".blue(),
            };
            writeln!(
                self.writer,
                "    {}:{}  {}  {}  {}",
                finding.location.line,
                finding.location.column,
                severity,
                finding.rule.as_str().dimmed(),
                finding.message
            )?;
        }

        if self.verbose {
            let statuses: Vec<String> = report
                .summary
                .iter()
                .filter(|(family, _)| **family != RuleFamily::Parse)
                .map(|(family, status)| format!("{} {}", family, status_label(*status)))
                .collect();
            writeln!(self.writer, "    {}", statuses.join(", "))?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_batch(&mut self, batch: &BatchReport) -> anyhow::Result<()> {
        for report in &batch.reports {
            self.write_report(report)?;
        }

        let total = batch.reports.len();
        let failed = batch.failed_files();
        let findings: usize = batch.reports.iter().map(|r| r.findings.len()).sum();
        writeln!(self.writer)?;
        if batch.cancelled {
            writeln!(self.writer, "{}", "Check cancelled before all files finished".yellow())?;
        }
        let line = format!(
            "{} files checked, {} failed, {} findings",
            total, failed, findings
        );
        if failed == 0 && !batch.cancelled {
            writeln!(self.writer, "{} {}", "✔".green(), line.green())?;
        } else {
            writeln!(self.writer, "{} {}", "✘".red(), line.red())?;
        }
        Ok(())
    }
}

/// Pick the writer for `format`; `verbose` only affects terminal output.
pub fn create_writer<'a, W: Write + 'a>(
    format: OutputFormat,
    writer: W,
    verbose: bool,
) -> Box<dyn OutputWriter + 'a> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer).verbose(verbose)),
    }
}

fn status_label(status: RuleStatus) -> ColoredString {
    match status {
        RuleStatus::Passed => "passed".green(),
        RuleStatus::Failed => "failed".red(),
        RuleStatus::NotEvaluated => "not evaluated".dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplianceConfig;
    use crate::pipeline::{check_batch, CancellationToken, NoCoverage, SourceInput};

    fn batch() -> BatchReport {
        let inputs = vec![
            SourceInput::new("ok.py", "X = 1\n"),
            SourceInput::new("bad.py", "def Bad():\n    pass\n"),
        ];
        check_batch(
            &inputs,
            &NoCoverage,
            &ComplianceConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_json_output_round_trips() {
        let batch = batch();
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_batch(&batch).unwrap();
        let parsed: BatchReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, batch);
    }

    #[test]
    fn test_terminal_output_lists_failures() {
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer).write_batch(&batch()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("bad.py"));
        assert!(!text.contains("ok.py"));
        assert!(text.contains("doc-missing"));
        assert!(text.contains("naming"));
        assert!(text.contains("2 files checked, 1 failed, 2 findings"));
    }

    #[test]
    fn test_verbose_terminal_output_shows_statuses() {
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer)
            .verbose(true)
            .write_batch(&batch())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("ok.py"));
        assert!(text.contains("coverage"));
        assert!(text.contains("not evaluated"));
    }
}
