//! Installed-package registries.
//!
//! A [`PackageRegistry`] answers "which version of this package is
//! installed?" for normalized package names. [`PipRegistry`] asks pip once
//! and caches the answer for the lifetime of the registry; [`StaticRegistry`]
//! serves a fixed map.

use crate::error::{MedicError, Result};
use crate::requirements::spec::normalize_name;
use crate::shell::{display_command, execute, CommandOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Upper bound for the one-time `pip list` call.
const LIST_TIMEOUT: Duration = Duration::from_secs(120);

/// Lookup of installed package versions.
pub trait PackageRegistry {
    /// Return the installed version of `normalized_name`, or `None` when the
    /// package is not installed.
    fn installed_version(&self, normalized_name: &str) -> Result<Option<String>>;
}

/// A registry backed by a fixed name → version map.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    packages: HashMap<String, String>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package; the name is normalized.
    pub fn with_package(mut self, name: &str, version: &str) -> Self {
        self.insert(name, version);
        self
    }

    /// Add or replace a package; the name is normalized.
    pub fn insert(&mut self, name: &str, version: &str) {
        self.packages
            .insert(normalize_name(name), version.trim().to_string());
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for StaticRegistry {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut registry = StaticRegistry::new();
        for (name, version) in iter {
            registry.insert(name, version);
        }
        registry
    }
}

impl PackageRegistry for StaticRegistry {
    fn installed_version(&self, normalized_name: &str) -> Result<Option<String>> {
        Ok(self.packages.get(normalized_name).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
    version: String,
}

/// A registry that queries `<python> -m pip list --format=json` on first use.
///
/// Failures are cached as well, so a broken interpreter is reported once per
/// spec without re-running pip for each lookup.
#[derive(Debug)]
pub struct PipRegistry {
    python: String,
    installed: OnceLock<std::result::Result<StaticRegistry, String>>,
}

impl PipRegistry {
    /// Create a registry for the given Python interpreter.
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            installed: OnceLock::new(),
        }
    }

    /// The interpreter this registry queries.
    pub fn python(&self) -> &str {
        &self.python
    }

    fn list_args() -> Vec<String> {
        ["-m", "pip", "list", "--format=json", "--disable-pip-version-check"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn load(&self) -> std::result::Result<StaticRegistry, String> {
        let args = Self::list_args();
        let options = CommandOptions {
            timeout: Some(LIST_TIMEOUT),
        };
        let result = execute(&self.python, &args, &options).map_err(|e| e.to_string())?;

        if result.timed_out {
            return Err(format!(
                "'{}' timed out after {}s",
                display_command(&self.python, &args),
                LIST_TIMEOUT.as_secs()
            ));
        }
        if result.exit_code != Some(0) {
            return Err(format!(
                "'{}' exited with code {:?}: {}",
                display_command(&self.python, &args),
                result.exit_code,
                result.stderr.trim()
            ));
        }

        parse_pip_list(&result.stdout)
    }
}

/// Parse the JSON emitted by `pip list --format=json`.
fn parse_pip_list(json: &str) -> std::result::Result<StaticRegistry, String> {
    let entries: Vec<PipListEntry> =
        serde_json::from_str(json).map_err(|e| format!("unexpected pip list output: {}", e))?;
    tracing::debug!(count = entries.len(), "loaded installed packages");
    Ok(entries
        .iter()
        .map(|e| (e.name.as_str(), e.version.as_str()))
        .collect())
}

impl PackageRegistry for PipRegistry {
    fn installed_version(&self, normalized_name: &str) -> Result<Option<String>> {
        match self.installed.get_or_init(|| self.load()) {
            Ok(registry) => registry.installed_version(normalized_name),
            Err(message) => Err(MedicError::ExternalToolFailure {
                command: display_command(&self.python, &Self::list_args()),
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_registry_normalizes_names() {
        let registry = StaticRegistry::new().with_package("Foo_Bar", "1.0");
        assert_eq!(
            registry.installed_version("foo-bar").unwrap(),
            Some("1.0".to_string())
        );
        assert_eq!(registry.installed_version("missing").unwrap(), None);
    }

    #[test]
    fn static_registry_from_iter() {
        let registry: StaticRegistry = [("libfoo", "1.5.0"), ("LibBaz", "0.1")]
            .into_iter()
            .collect();
        assert_eq!(registry.len(), 2);
        assert!(registry.installed_version("libbaz").unwrap().is_some());
    }

    #[test]
    fn parses_pip_list_json() {
        let json = r#"[{"name": "PyYAML", "version": "6.0.1"}, {"name": "requests", "version": "2.31.0"}]"#;
        let registry = parse_pip_list(json).unwrap();
        assert_eq!(
            registry.installed_version("pyyaml").unwrap(),
            Some("6.0.1".to_string())
        );
    }

    #[test]
    fn rejects_non_json_pip_output() {
        assert!(parse_pip_list("Package Version\n------- -------").is_err());
    }

    #[test]
    fn pip_registry_with_missing_interpreter_reports_tool_failure() {
        let registry = PipRegistry::new("/nonexistent/medic-python");
        let err = registry.installed_version("anything").unwrap_err();
        assert!(matches!(err, MedicError::ExternalToolFailure { .. }));

        // Cached failure is reported again without panicking.
        assert!(registry.installed_version("other").is_err());
    }
}
