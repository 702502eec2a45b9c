//! Log retrieval: locate, tail, filter, and diagnose.

use crate::error::MedicError;
use crate::logs::filter::{LevelFilter, LogFilter};
use crate::logs::patterns::{DiagnosticHint, DiagnosticMatcher};
use crate::logs::tail::LogTailer;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default number of lines to tail.
pub const DEFAULT_TAIL_LINES: usize = 200;

/// Overall status of a log fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    /// The file has no lines.
    Empty,
    /// No path configured, or the file does not exist.
    NoLogFile,
    /// Permission or I/O failure.
    ErrorReading,
    /// Lines were read but none passed the filter.
    EmptyAfterFilter,
}

/// What to fetch.
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub lines: usize,
    pub level: LevelFilter,
    pub keyword: Option<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            lines: DEFAULT_TAIL_LINES,
            level: LevelFilter::All,
            keyword: None,
        }
    }
}

/// Result of a log fetch.
#[derive(Debug, Clone, Serialize)]
pub struct LogReport {
    pub path: Option<PathBuf>,
    pub status: LogStatus,
    /// Filtered lines, oldest first. Empty unless the status is `Success`.
    pub lines: Vec<String>,
    /// Explanation for any status other than `Success`.
    pub message: Option<String>,
    /// Number of lines read before filtering.
    pub raw_count: usize,
}

impl LogReport {
    fn status(path: Option<&Path>, status: LogStatus, message: String) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            status,
            lines: Vec::new(),
            message: Some(message),
            raw_count: 0,
        }
    }
}

/// Fetches and diagnoses a single log file.
#[derive(Debug, Clone, Default)]
pub struct LogAnalyzer {
    path: Option<PathBuf>,
    tailer: LogTailer,
    matcher: DiagnosticMatcher,
}

impl LogAnalyzer {
    /// Create an analyzer; `None` means no log file is configured.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    pub fn with_tailer(mut self, tailer: LogTailer) -> Self {
        self.tailer = tailer;
        self
    }

    pub fn with_matcher(mut self, matcher: DiagnosticMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Tail and filter the log. Never fails; problems become a status.
    pub fn fetch(&self, query: &LogQuery) -> LogReport {
        let Some(path) = self.path.as_deref() else {
            return LogReport::status(
                None,
                LogStatus::NoLogFile,
                "Log file path is not configured.".to_string(),
            );
        };

        let raw = match self.tailer.tail(path, query.lines) {
            Ok(raw) => raw,
            Err(MedicError::NotFound { .. }) => {
                return LogReport::status(
                    Some(path),
                    LogStatus::NoLogFile,
                    format!("Log file '{}' not found.", path.display()),
                )
            }
            Err(MedicError::PermissionDenied { .. }) => {
                return LogReport::status(
                    Some(path),
                    LogStatus::ErrorReading,
                    format!(
                        "Permission denied when trying to read log file '{}'.",
                        path.display()
                    ),
                )
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to tail log");
                return LogReport::status(
                    Some(path),
                    LogStatus::ErrorReading,
                    format!("An error occurred while reading the log file: {}", err),
                );
            }
        };

        if raw.is_empty() {
            return LogReport::status(
                Some(path),
                LogStatus::Empty,
                "Log file is empty or no lines fetched.".to_string(),
            );
        }

        let filter = LogFilter::new(query.level, query.keyword.as_deref());
        let lines = filter.apply(&raw);
        tracing::debug!(read = raw.len(), kept = lines.len(), "filtered log lines");

        if lines.is_empty() {
            let mut report = LogReport::status(
                Some(path),
                LogStatus::EmptyAfterFilter,
                "No log entries found matching the current filter criteria.".to_string(),
            );
            report.raw_count = raw.len();
            return report;
        }

        LogReport {
            path: Some(path.to_path_buf()),
            status: LogStatus::Success,
            raw_count: raw.len(),
            lines,
            message: None,
        }
    }

    /// Diagnose a set of lines, typically `fetch(..).lines`.
    pub fn diagnose(&self, lines: &[String]) -> Vec<DiagnosticHint> {
        self.matcher.diagnose(lines)
    }
}
