//! Log line parsing and level/keyword filtering.
//!
//! Server log lines look like:
//!
//! ```text
//! 2024-03-01 10:30:00,123 4242 ERROR prod_db odoo.sql_db: connection failed
//! ```
//!
//! Lines that don't follow this layout (tracebacks, continuation lines) are
//! kept as raw text with no parsed record.

use crate::error::MedicError;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static RE_LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<timestamp>\d{4}-\d{2}-\d{2}\ \d{2}:\d{2}:\d{2},\d{3})\s+
        (?P<pid>\d+)\s+
        (?P<level>DEBUG|INFO|WARNING|ERROR|CRITICAL|TEST)\s+
        (?P<database>[a-zA-Z0-9_?.-]*)\s+
        (?P<component>[^:]+):\s+
        (?P<message>.*)$",
    )
    .unwrap()
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Log severity as written in the level column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Test,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Test => "TEST",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = MedicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            "TEST" => Ok(LogLevel::Test),
            _ => Err(MedicError::MalformedInput {
                input: s.to_string(),
                message: "expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL, TEST".to_string(),
            }),
        }
    }
}

/// The structured fields of a well-formed log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub pid: u32,
    pub level: LogLevel,
    /// Database or context tag; may be empty or `?`.
    pub database: String,
    pub component: String,
    pub message: String,
}

/// A raw log line with its parsed record, if it had one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub raw: String,
    pub record: Option<LogRecord>,
}

impl LogLine {
    /// Parse a line; malformed lines get no record.
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            record: parse_record(raw),
        }
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.record.as_ref().map(|r| r.level)
    }
}

fn parse_record(raw: &str) -> Option<LogRecord> {
    let caps = RE_LOG_LINE.captures(raw)?;
    let timestamp = NaiveDateTime::parse_from_str(&caps["timestamp"], TIMESTAMP_FORMAT).ok()?;
    Some(LogRecord {
        timestamp,
        pid: caps["pid"].parse().ok()?,
        level: caps["level"].parse().ok()?,
        database: caps["database"].to_string(),
        component: caps["component"].trim().to_string(),
        message: caps["message"].to_string(),
    })
}

/// Which levels to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LogLevel),
}

impl LevelFilter {
    /// Broad filters also keep lines that have no parsed level.
    pub fn is_broad(&self) -> bool {
        matches!(
            self,
            LevelFilter::All | LevelFilter::Only(LogLevel::Info) | LevelFilter::Only(LogLevel::Debug)
        )
    }
}

impl FromStr for LevelFilter {
    type Err = MedicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(LevelFilter::All)
        } else {
            s.parse().map(LevelFilter::Only)
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFilter::All => f.write_str("ALL"),
            LevelFilter::Only(level) => write!(f, "{}", level),
        }
    }
}

/// Level and keyword filter over raw lines.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    level: LevelFilter,
    keyword: Option<String>,
}

impl LogFilter {
    /// Create a filter. An empty keyword means no keyword filtering.
    pub fn new(level: LevelFilter, keyword: Option<&str>) -> Self {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);
        Self { level, keyword }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Whether the filter keeps everything.
    pub fn is_identity(&self) -> bool {
        self.level == LevelFilter::All && self.keyword.is_none()
    }

    /// Whether a single raw line passes.
    pub fn matches(&self, line: &str) -> bool {
        self.matches_line(&LogLine::parse(line))
    }

    /// Whether an already parsed line passes.
    pub fn matches_line(&self, line: &LogLine) -> bool {
        if let Some(keyword) = &self.keyword {
            if !line.raw.to_lowercase().contains(keyword.as_str()) {
                return false;
            }
        }

        match self.level {
            LevelFilter::All => true,
            LevelFilter::Only(wanted) => match line.level() {
                Some(level) => level == wanted,
                None => self.level.is_broad(),
            },
        }
    }

    /// Parse and keep the passing lines, preserving order.
    pub fn select(&self, lines: &[String]) -> Vec<LogLine> {
        lines
            .iter()
            .map(|l| LogLine::parse(l))
            .filter(|l| self.matches_line(l))
            .collect()
    }

    /// Keep the passing raw lines, preserving order.
    pub fn apply(&self, lines: &[String]) -> Vec<String> {
        self.select(lines).into_iter().map(|l| l.raw).collect()
    }
}
