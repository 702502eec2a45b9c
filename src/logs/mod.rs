//! Log tail retrieval and diagnosis.
//!
//! - [`tail`] - Backward chunked reads of the last N lines
//! - [`filter`] - Line parsing plus level and keyword filters
//! - [`patterns`] - Diagnostic rules and the matcher
//! - [`analyzer`] - The combined fetch pipeline with status reporting

pub mod analyzer;
pub mod filter;
pub mod patterns;
pub mod tail;

pub use analyzer::{LogAnalyzer, LogQuery, LogReport, LogStatus, DEFAULT_TAIL_LINES};
pub use filter::{LevelFilter, LogFilter, LogLevel, LogLine, LogRecord};
pub use patterns::{
    builtin_rules, DiagnosticHint, DiagnosticMatcher, DiagnosticRule, HintAction, FALLBACK_HINT,
};
pub use tail::{tail_lines, LogTailer, DEFAULT_CHUNK_SIZE};
