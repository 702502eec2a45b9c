//! Diagnostic rules for common server failures.
//!
//! Each rule pairs a regex with a [`HintAction`]. Every rule that matches a
//! candidate line contributes a hint, and each hint text is reported at most
//! once per run.

use crate::error::{MedicError, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Longest tail of a log line quoted in a hint.
pub const EXCERPT_CHARS: usize = 150;

/// Hint reported when no rule matched.
pub const FALLBACK_HINT: &str = "No specific common issues automatically diagnosed from the current log view. Review logs manually for details.";

/// Markers that make a line a diagnosis candidate.
const CANDIDATE_MARKERS: &[&str] = &["WARNING", "ERROR", "CRITICAL"];

/// How a rule turns a match into hint text.
#[derive(Clone, Copy)]
pub enum HintAction {
    /// Fixed text.
    Constant(&'static str),
    /// Text computed from the match captures.
    Derived(fn(&Captures<'_>) -> String),
}

impl HintAction {
    fn render(&self, caps: &Captures<'_>) -> String {
        match self {
            HintAction::Constant(text) => (*text).to_string(),
            HintAction::Derived(build) => build(caps),
        }
    }
}

impl fmt::Debug for HintAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintAction::Constant(text) => f.debug_tuple("Constant").field(text).finish(),
            HintAction::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// A named pattern with its hint.
#[derive(Debug, Clone)]
pub struct DiagnosticRule {
    pub name: String,
    pub regex: Regex,
    pub action: HintAction,
}

impl DiagnosticRule {
    /// Compile a rule from a pattern string.
    pub fn new(name: impl Into<String>, pattern: &str, action: HintAction) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| MedicError::MalformedInput {
            input: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            name: name.into(),
            regex,
            action,
        })
    }

    fn from_static(name: &str, regex: &LazyLock<Regex>, action: HintAction) -> Self {
        Self {
            name: name.to_string(),
            regex: (**regex).clone(),
            action,
        }
    }
}

/// An actionable hint derived from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticHint {
    pub text: String,
    /// Rule that produced the hint; `None` for the fallback.
    pub rule: Option<String>,
    /// Tail of the triggering line.
    pub excerpt: Option<String>,
}

impl DiagnosticHint {
    fn fallback() -> Self {
        Self {
            text: FALLBACK_HINT.to_string(),
            rule: None,
            excerpt: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.rule.is_none()
    }
}

impl fmt::Display for DiagnosticHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.excerpt {
            Some(excerpt) => write!(f, "- {} (related to log: ...{})", self.text, excerpt),
            None => f.write_str(&self.text),
        }
    }
}

// --- Compiled regexes (one-time via LazyLock) ---

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(
    RE_DATABASE_MISSING,
    r#"(?i)OperationalError: FATAL:\s+database ".*" does not exist"#
);
lazy_regex!(
    RE_PASSWORD_AUTH,
    r"(?i)psycopg2\.OperationalError: FATAL:\s+password authentication failed for user"
);
lazy_regex!(RE_CONNECTION_REFUSED, r"(?i)Connection refused");
lazy_regex!(RE_WKHTMLTOPDF, r"(?i)wkhtmltopdf: error");
lazy_regex!(RE_PERMISSION_DENIED, r"(?i)Permission denied");
lazy_regex!(
    RE_MISSING_MODULE,
    r"(?i)(?:ImportError|ModuleNotFoundError): No module named '([\w.]+)'"
);
lazy_regex!(
    RE_DNS_FAILURE,
    r"(?i)could not translate host name .* to address: Temporary failure in name resolution"
);
lazy_regex!(
    RE_BUS_UNAVAILABLE,
    r"(?i)bus\.Bus unavailable, Bus\.Notification unavailable"
);

fn missing_module_hint(caps: &Captures<'_>) -> String {
    let module = caps.get(1).map_or("", |m| m.as_str());
    format!(
        "Hint: Python module '{}' not found. It needs to be installed in the server's Python environment (e.g. 'pip install {}').",
        module, module
    )
}

/// The built-in rule set, in evaluation order.
pub fn builtin_rules() -> Vec<DiagnosticRule> {
    vec![
        DiagnosticRule::from_static(
            "database_missing",
            &RE_DATABASE_MISSING,
            HintAction::Constant(
                "Hint: The database the server is trying to connect to does not exist. Verify 'db_name' in the server configuration or create the database in PostgreSQL.",
            ),
        ),
        DiagnosticRule::from_static(
            "password_auth_failed",
            &RE_PASSWORD_AUTH,
            HintAction::Constant(
                "Hint: PostgreSQL password authentication failed. Check 'db_user' and 'db_password' in the server configuration and the user's privileges in PostgreSQL.",
            ),
        ),
        DiagnosticRule::from_static(
            "connection_refused",
            &RE_CONNECTION_REFUSED,
            HintAction::Constant(
                "Hint: The server could not connect to PostgreSQL. Ensure PostgreSQL is running and reachable on the configured 'db_host' and 'db_port', and check firewall rules.",
            ),
        ),
        DiagnosticRule::from_static(
            "wkhtmltopdf_error",
            &RE_WKHTMLTOPDF,
            HintAction::Constant(
                "Hint: wkhtmltopdf failed, likely during PDF report generation. Ensure it is installed, on PATH, and has its shared libraries (e.g. libXrender).",
            ),
        ),
        DiagnosticRule::from_static(
            "permission_denied",
            &RE_PERMISSION_DENIED,
            HintAction::Constant(
                "Hint: 'Permission denied' detected. This can relate to file system access (attachments, log file, module paths) or database access. Check the full error message for context.",
            ),
        ),
        DiagnosticRule::from_static(
            "missing_python_module",
            &RE_MISSING_MODULE,
            HintAction::Derived(missing_module_hint),
        ),
        DiagnosticRule::from_static(
            "dns_failure",
            &RE_DNS_FAILURE,
            HintAction::Constant(
                "Hint: DNS resolution failed. The server could not resolve a hostname for an outgoing connection (SMTP, external APIs). Check DNS configuration and network connectivity.",
            ),
        ),
        DiagnosticRule::from_static(
            "bus_unavailable",
            &RE_BUS_UNAVAILABLE,
            HintAction::Constant(
                "Hint: Longpolling/bus features are unavailable. Check that 'workers' is above 0 and that the longpolling port (default 8072) is reachable through any reverse proxy or firewall.",
            ),
        ),
    ]
}

/// Matches log lines against a rule set.
#[derive(Debug, Clone)]
pub struct DiagnosticMatcher {
    rules: Vec<DiagnosticRule>,
}

impl Default for DiagnosticMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticMatcher {
    /// A matcher with the built-in rules.
    pub fn new() -> Self {
        Self::with_rules(builtin_rules())
    }

    /// A matcher with a custom rule set.
    pub fn with_rules(rules: Vec<DiagnosticRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DiagnosticRule] {
        &self.rules
    }

    /// Produce hints for the given lines.
    ///
    /// Always returns at least one hint: the fallback when nothing matched.
    pub fn diagnose(&self, lines: &[String]) -> Vec<DiagnosticHint> {
        let mut hints = Vec::new();
        let mut emitted = HashSet::new();

        for line in lines {
            if !CANDIDATE_MARKERS.iter().any(|m| line.contains(m)) {
                continue;
            }

            for rule in &self.rules {
                let Some(caps) = rule.regex.captures(line) else {
                    continue;
                };
                let text = rule.action.render(&caps);
                if emitted.insert(text.clone()) {
                    tracing::debug!(rule = %rule.name, "diagnostic rule matched");
                    hints.push(DiagnosticHint {
                        text,
                        rule: Some(rule.name.clone()),
                        excerpt: Some(excerpt(line)),
                    });
                }
            }
        }

        if hints.is_empty() {
            hints.push(DiagnosticHint::fallback());
        }
        hints
    }
}

fn excerpt(line: &str) -> String {
    let count = line.chars().count();
    line.chars()
        .skip(count.saturating_sub(EXCERPT_CHARS))
        .collect()
}
