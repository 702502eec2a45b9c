//! Version parsing, ordering, and constraint evaluation.
//!
//! Versions follow the common Python packaging shape: an optional epoch
//! (`1!`), dot-separated numeric release segments, and optional pre-release
//! (`a`, `b`, `rc`), post-release (`.post1`, `-1`), dev-release (`.dev0`) and
//! local (`+ubuntu1`) parts.
//!
//! Ordering: `1.0.dev0 < 1.0a1 < 1.0rc1 < 1.0 < 1.0.post1`. Trailing zero
//! release segments are insignificant (`1.0 == 1.0.0`). Local labels are
//! ignored for ordering.

use crate::error::{MedicError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static RE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_n1>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .unwrap()
});

/// Pre-release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Candidate,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Candidate,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Candidate => "rc",
        }
    }
}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// Position of the pre-release part in the total order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    /// `X.devN` with no pre or post part sorts before every pre-release of X.
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        let caps = RE_VERSION
            .captures(&normalized)
            .ok_or_else(|| MedicError::MalformedInput {
                input: input.to_string(),
                message: "not a recognizable version".to_string(),
            })?;

        let number = |name: &str| -> Result<Option<u64>> {
            caps.name(name)
                .map(|m| {
                    m.as_str().parse::<u64>().map_err(|e| MedicError::MalformedInput {
                        input: input.to_string(),
                        message: format!("version segment out of range: {}", e),
                    })
                })
                .transpose()
        };

        let release = caps["release"]
            .split('.')
            .map(|seg| {
                seg.parse::<u64>().map_err(|e| MedicError::MalformedInput {
                    input: input.to_string(),
                    message: format!("version segment out of range: {}", e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                PreRelease::from_label(label.as_str()),
                number("pre_n")?.unwrap_or(0),
            )),
            None => None,
        };

        let post = if caps.name("post_n1").is_some() {
            number("post_n1")?
        } else if caps.name("post_l").is_some() {
            Some(number("post_n2")?.unwrap_or(0))
        } else {
            None
        };

        let dev = if caps.name("dev_l").is_some() {
            Some(number("dev_n")?.unwrap_or(0))
        } else {
            None
        };

        Ok(Self {
            raw: input.trim().to_string(),
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_string()),
        })
    }

    /// The release segments as written (`[1, 2, 0]` for `1.2.0`).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether this is a pre-release or dev-release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// The version as originally written, trimmed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Canonical public form (`1!2.0rc1.post2.dev3`), without the local label.
    pub fn public(&self) -> String {
        let mut out = String::new();
        if self.epoch != 0 {
            out.push_str(&format!("{}!", self.epoch));
        }
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        out.push_str(&release.join("."));
        if let Some((phase, n)) = self.pre {
            out.push_str(&format!("{}{}", phase.as_str(), n));
        }
        if let Some(n) = self.post {
            out.push_str(&format!(".post{}", n));
        }
        if let Some(n) = self.dev {
            out.push_str(&format!(".dev{}", n));
        }
        out
    }

    /// Release segments with trailing zeros removed.
    fn trimmed_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|n| *n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }

    /// Release segments padded with zeros (or truncated) to `len`.
    fn padded_release(&self, len: usize) -> Vec<u64> {
        let mut out: Vec<u64> = self.release.iter().copied().take(len).collect();
        out.resize(len, 0);
        out
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((phase, n)), _, _) => PreKey::Pre(phase, n),
            (None, _, _) => PreKey::Final,
        }
    }

    /// Dev releases sort before the same version without one.
    fn dev_key(&self) -> (bool, u64) {
        (self.dev.is_none(), self.dev.unwrap_or(0))
    }

    /// Whether both versions share epoch and release (ignoring trailing zeros).
    fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && self.trimmed_release() == other.trimmed_release()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Comparison operator of a single specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `~=`
    Compatible,
    /// `===`
    Arbitrary,
}

impl Operator {
    /// Longest operators first so `===` is not read as `==`.
    const TOKENS: [(&'static str, Operator); 8] = [
        ("===", Operator::Arbitrary),
        ("~=", Operator::Compatible),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
        }
    }

    fn split_prefix(input: &str) -> Option<(Operator, &str)> {
        Self::TOKENS
            .iter()
            .find_map(|(token, op)| input.strip_prefix(*token).map(|rest| (*op, rest)))
    }
}

/// One comparator/version pair such as `>=1.2`.
#[derive(Debug, Clone)]
pub struct Specifier {
    op: Operator,
    text: String,
    version: Option<Version>,
    wildcard: bool,
}

impl Specifier {
    /// Parse a single specifier (`>=1.2`, `==1.4.*`, `~=2.2`).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let malformed = |message: &str| MedicError::MalformedInput {
            input: trimmed.to_string(),
            message: message.to_string(),
        };

        let (op, rest) = Operator::split_prefix(trimmed)
            .ok_or_else(|| malformed("missing comparison operator"))?;
        let text = rest.trim();
        if text.is_empty() {
            return Err(malformed("missing version after operator"));
        }

        if op == Operator::Arbitrary {
            return Ok(Self {
                op,
                text: text.to_string(),
                version: None,
                wildcard: false,
            });
        }

        let (version_text, wildcard) = match text.strip_suffix(".*") {
            Some(prefix) => {
                if !matches!(op, Operator::Equal | Operator::NotEqual) {
                    return Err(malformed("wildcard is only allowed with == and !="));
                }
                (prefix, true)
            }
            None => (text, false),
        };

        let version = Version::parse(version_text)?;
        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(malformed("~= requires at least two release segments"));
        }

        Ok(Self {
            op,
            text: text.to_string(),
            version: Some(version),
            wildcard,
        })
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    /// Test a candidate version against this specifier.
    pub fn contains(&self, candidate: &Version) -> bool {
        let Some(spec) = &self.version else {
            // `===` is a plain string comparison.
            return candidate.as_str().eq_ignore_ascii_case(&self.text);
        };

        match self.op {
            Operator::Equal => self.equals(spec, candidate),
            Operator::NotEqual => !self.equals(spec, candidate),
            Operator::LessEqual => candidate <= spec,
            Operator::GreaterEqual => candidate >= spec,
            Operator::Less => {
                candidate < spec
                    && !(!spec.is_prerelease()
                        && candidate.is_prerelease()
                        && candidate.same_release(spec))
            }
            Operator::Greater => {
                candidate > spec
                    && !(!spec.is_postrelease()
                        && candidate.is_postrelease()
                        && candidate.same_release(spec))
            }
            Operator::Compatible => {
                let prefix_len = spec.release().len() - 1;
                candidate >= spec
                    && candidate.epoch() == spec.epoch()
                    && candidate.padded_release(prefix_len) == spec.padded_release(prefix_len)
            }
            Operator::Arbitrary => false,
        }
    }

    fn equals(&self, spec: &Version, candidate: &Version) -> bool {
        if self.wildcard {
            let len = spec.release().len();
            candidate.epoch() == spec.epoch()
                && candidate.padded_release(len) == spec.release()
        } else {
            candidate == spec
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.text)
    }
}

/// A conjunction of specifiers, e.g. `>=1.2,<2.0`.
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parse a comma-separated specifier list.
    ///
    /// An empty or whitespace-only input yields an empty set, which every
    /// version satisfies.
    pub fn parse(input: &str) -> Result<Self> {
        let specifiers = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { specifiers })
    }

    /// Whether every specifier in the set holds for `candidate`.
    ///
    /// A pre-release or dev-release candidate is only admitted when some
    /// specifier in the set names a pre-release itself, so `>=1.0` rejects
    /// `1.5rc1` while `>=1.0rc1` accepts it. The empty set admits everything.
    pub fn contains(&self, candidate: &Version) -> bool {
        if candidate.is_prerelease() && !self.is_empty() && !self.allows_prereleases() {
            return false;
        }
        self.specifiers.iter().all(|s| s.contains(candidate))
    }

    /// Whether any specifier is pinned to a pre-release version.
    pub fn allows_prereleases(&self) -> bool {
        self.specifiers.iter().any(|s| match &s.version {
            Some(version) => version.is_prerelease(),
            None => Version::parse(&s.text).is_ok_and(|v| v.is_prerelease()),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.specifiers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specifiers.len()
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
