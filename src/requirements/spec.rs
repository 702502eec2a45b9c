//! Requirement spec parsing.
//!
//! Accepts the requirement lines found in requirements files:
//!
//! ```text
//! name
//! name>=1.2,<2.0
//! name[extra1,extra2] (>=1.2)
//! name==1.4.* ; python_version < "3.12"
//! name @ https://example.com/name-1.0.tar.gz
//! ```
//!
//! Environment markers are recorded but not evaluated.

use crate::error::{MedicError, Result};
use crate::requirements::version::SpecifierSet;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Characters that end the name part of a requirement in best-effort mode.
const NAME_TERMINATORS: &[char] = &['=', '<', '>', '!', '~', ';', '[', '@', '(', ' ', '\t'];

/// Normalize a package name so case and separator variants compare equal.
///
/// `Foo_Bar`, `foo-bar` and `foo.bar` all normalize to `foo-bar`.
pub fn normalize_name(name: &str) -> String {
    RE_SEPARATORS
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}

fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

/// Cut a raw requirement at the first comparator or delimiter character.
///
/// This is the heuristic used when a spec cannot be parsed properly, and by
/// the name-only matcher: `libfoo>=1.2` becomes `libfoo`.
pub fn strip_version_suffix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find(NAME_TERMINATORS) {
        Some(idx) => trimmed[..idx].trim(),
        None => trimmed,
    }
}

/// A parsed requirement: a package name plus an optional constraint.
#[derive(Debug, Clone)]
pub struct RequirementSpec {
    raw: String,
    name: String,
    normalized: String,
    extras: Vec<String>,
    specifiers: Option<SpecifierSet>,
    marker: Option<String>,
    url: Option<String>,
}

impl RequirementSpec {
    /// Parse a raw requirement string.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let malformed = |message: String| MedicError::MalformedInput {
            input: trimmed.to_string(),
            message,
        };

        let (body, marker) = match trimmed.split_once(';') {
            Some((body, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(malformed("empty environment marker".to_string()));
                }
                (body.trim(), Some(marker.to_string()))
            }
            None => (trimmed, None),
        };

        let name_end = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(body.len());
        let name = &body[..name_end];
        if !is_valid_name(name) {
            return Err(malformed(format!("invalid package name '{}'", name)));
        }

        let mut rest = body[name_end..].trim_start();

        let mut extras = Vec::new();
        if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = after_bracket
                .find(']')
                .ok_or_else(|| malformed("unterminated extras list".to_string()))?;
            for extra in after_bracket[..close].split(',').map(str::trim) {
                if extra.is_empty() {
                    continue;
                }
                if !is_valid_name(extra) {
                    return Err(malformed(format!("invalid extra '{}'", extra)));
                }
                extras.push(normalize_name(extra));
            }
            rest = after_bracket[close + 1..].trim_start();
        }

        let mut url = None;
        let mut specifiers = None;

        if let Some(location) = rest.strip_prefix('@') {
            let location = location.trim();
            if location.is_empty() {
                return Err(malformed("missing URL after '@'".to_string()));
            }
            url = Some(location.to_string());
        } else {
            let constraint = match rest.strip_prefix('(') {
                Some(inner) => inner
                    .trim_end()
                    .strip_suffix(')')
                    .ok_or_else(|| malformed("unterminated '(' in constraint".to_string()))?,
                None => rest,
            };
            let set = SpecifierSet::parse(constraint)?;
            if !set.is_empty() {
                specifiers = Some(set);
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            name: name.to_string(),
            normalized: normalize_name(name),
            extras,
            specifiers,
            marker,
            url,
        })
    }

    /// Best-effort name extraction ignoring any constraint.
    ///
    /// Fails only when no valid package name can be recovered.
    pub fn name_only(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let name = strip_version_suffix(trimmed);
        if !is_valid_name(name) {
            return Err(MedicError::MalformedInput {
                input: trimmed.to_string(),
                message: "no package name could be extracted".to_string(),
            });
        }
        Ok(Self {
            raw: trimmed.to_string(),
            name: name.to_string(),
            normalized: normalize_name(name),
            extras: Vec::new(),
            specifiers: None,
            marker: None,
            url: None,
        })
    }

    /// The requirement as written, trimmed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The package name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized package name used for registry lookups. Never empty.
    pub fn normalized_name(&self) -> &str {
        &self.normalized
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// The version constraint, if one was declared.
    pub fn specifiers(&self) -> Option<&SpecifierSet> {
        self.specifiers.as_ref()
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl fmt::Display for RequirementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
