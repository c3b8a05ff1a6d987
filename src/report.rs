//! Run reports
//!
//! Per-source results, console rendering and the JSON report written at the
//! end of a command-line run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::validation::{Diagnostic, ValidationReport};

const RULE: &str =
    "================================================================================";

/// Outcome of one source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// Validated with no errors
    Passed,
    /// Validated with at least one error
    Failed,
    /// Could not be validated at all
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub source: String,
    pub status: SourceStatus,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the source finished validating
    pub timestamp: DateTime<Utc>,
}

impl SourceResult {
    pub fn from_report(source: impl Into<String>, report: ValidationReport) -> Self {
        let status = if report.is_valid() {
            SourceStatus::Passed
        } else {
            SourceStatus::Failed
        };
        let (errors, warnings) = report.into_parts();
        Self {
            source: source.into(),
            status,
            error_count: errors.len(),
            warning_count: warnings.len(),
            errors,
            warnings,
            message: None,
            timestamp: Utc::now(),
        }
    }

    /// A source that could not be read or validated
    pub fn failure(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            status: SourceStatus::Error,
            errors: Vec::new(),
            warnings: Vec::new(),
            error_count: 0,
            warning_count: 0,
            message: Some(message.into()),
            timestamp: Utc::now(),
        }
    }

    /// Numbered text block per diagnostic, then the pass/fail verdict
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.source);
        let _ = writeln!(out, "{}", RULE);

        if let Some(message) = &self.message {
            let _ = writeln!(out, "Error: {}", message);
            return out;
        }

        for (index, diagnostic) in self.errors.iter().chain(&self.warnings).enumerate() {
            let _ = writeln!(
                out,
                "[{}] {} ({})",
                index + 1,
                diagnostic.severity(),
                diagnostic.rule()
            );
            let _ = writeln!(out, "Message: {}", diagnostic.message());
            match (diagnostic.line(), diagnostic.column()) {
                (Some(line), Some(column)) => {
                    let _ = writeln!(out, "Location: line {}, column {}", line, column);
                }
                (Some(line), None) => {
                    let _ = writeln!(out, "Location: line {}", line);
                }
                _ => {}
            }
            if let Some(extract) = diagnostic.extract() {
                let _ = writeln!(out, "Extract: {}", extract);
            }
            out.push_str("---\n");
        }

        match self.status {
            SourceStatus::Passed => {
                let _ = writeln!(out, "PASSED - no errors, {} warning(s)", self.warning_count);
            }
            _ => {
                let _ = writeln!(
                    out,
                    "FAILED - {} error(s), {} warning(s)",
                    self.error_count, self.warning_count
                );
            }
        }
        out
    }
}

/// Aggregate of a whole run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Serialized as RFC 3339 in UTC
    pub generated_at: DateTime<Utc>,
    pub total_sources: usize,
    pub passed_sources: usize,
    pub failed_sources: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub results: Vec<SourceResult>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            total_sources: 0,
            passed_sources: 0,
            failed_sources: 0,
            total_errors: 0,
            total_warnings: 0,
            results: Vec::new(),
        }
    }

    /// Record a result; errored sources count as failed
    pub fn push(&mut self, result: SourceResult) {
        self.total_sources += 1;
        match result.status {
            SourceStatus::Passed => self.passed_sources += 1,
            SourceStatus::Failed | SourceStatus::Error => self.failed_sources += 1,
        }
        self.total_errors += result.error_count;
        self.total_warnings += result.warning_count;
        self.results.push(result);
    }

    pub fn has_failures(&self) -> bool {
        self.failed_sources > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Summary:\n  Total sources: {}\n  Passed: {}\n  Failed: {}\n  Total errors: {}\n  Total warnings: {}",
            self.total_sources,
            self.passed_sources,
            self.failed_sources,
            self.total_errors,
            self.total_warnings
        )
    }

    /// Write the report as pretty JSON, returning the path actually written
    pub fn write_json(&self, path: &Path) -> Result<PathBuf> {
        let path = json_report_path(path);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(path)
    }
}

/// Append `.json` unless the path already ends with it
pub fn json_report_path(path: &Path) -> PathBuf {
    let has_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if has_json {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_os_string();
        raw.push(".json");
        PathBuf::from(raw)
    }
}
