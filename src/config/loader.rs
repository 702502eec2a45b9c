//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::MedicConfig;
use crate::error::{MedicError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project configuration.
pub const CONFIG_DIR: &str = ".medic";

/// Configuration files for a project, in merge order.
///
/// 1. Project config (`.medic/config.yml`)
/// 2. Local overrides (`.medic/config.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .medic/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .medic/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        let existing = |name: &str| {
            let path = dir.join(name);
            path.is_file().then_some(path)
        };
        Self {
            project: existing("config.yml"),
            project_local: existing("config.local.yml"),
        }
    }

    /// All existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

/// Find the project root by walking up from `start`.
///
/// A `.medic` directory marks the root; a `.git` directory is the fallback.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MedicError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => MedicError::from_io(e, path),
    })
}

/// Parse YAML content into a config. `source_path` is for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<MedicConfig> {
    if content.trim().is_empty() {
        return Ok(MedicConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| MedicError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and parse a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<MedicConfig> {
    parse_config(&read_config(path)?, path)
}

/// Load a config file as a raw YAML value for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|e| MedicError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the project and local configs.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists.
pub fn load_merged_config(project_root: &Path) -> Result<MedicConfig> {
    let paths = ConfigPaths::discover(project_root);
    let project_path = project_root.join(CONFIG_DIR).join("config.yml");

    if !paths.has_project_config() {
        return Err(MedicError::ConfigNotFound { path: project_path });
    }

    let layers = paths
        .all_existing()
        .into_iter()
        .map(|p| load_config_value(p))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_configs(&layers);
    serde_yaml::from_value(merged).map_err(|e| MedicError::ConfigParseError {
        path: project_path,
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with an optional path override, resolving relative paths.
///
/// With an override only that file is read; without one the project configs
/// are merged. Relative paths always resolve against the project root.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<MedicConfig> {
    let mut config = match config_override {
        Some(path) => load_config_file(path)?,
        None => load_merged_config(project_root)?,
    };
    config.resolve_paths(project_root);
    Ok(config)
}

/// Like [`load_config`], but a missing project config yields defaults.
///
/// An explicit override that doesn't exist is still an error.
pub fn load_config_or_default(
    project_root: &Path,
    config_override: Option<&Path>,
) -> Result<MedicConfig> {
    match load_config(project_root, config_override) {
        Err(MedicError::ConfigNotFound { path }) if config_override.is_none() => {
            tracing::debug!(path = %path.display(), "no project config, using defaults");
            Ok(MedicConfig::default())
        }
        other => other,
    }
}
