//! Configuration schema definitions for medic.
//!
//! These structs map to `.medic/config.yml`. Every field has a default, so
//! an empty file (or no file at all) is a valid configuration.

use crate::logs::{DEFAULT_CHUNK_SIZE, DEFAULT_TAIL_LINES};
use crate::requirements::scanner::{DEFAULT_MARKER_FILE, DEFAULT_REQUIREMENTS_FILE};
use crate::requirements::ResolverMode;
use crate::shell::default_python;
use crate::ui::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicConfig {
    /// General settings.
    pub settings: Settings,

    /// Module discovery and resolution.
    pub requirements: RequirementsConfig,

    /// Package installation.
    pub installer: InstallerConfig,

    /// Log retrieval.
    pub logs: LogsConfig,
}

/// General settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, normal, quiet, silent
    pub default_output: OutputMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    /// Directories whose immediate subdirectories are modules, in priority
    /// order.
    pub module_roots: Vec<PathBuf>,

    /// File that marks a directory as a module.
    pub marker_file: String,

    /// Requirements file looked for in each module.
    pub requirements_file: String,

    /// `constraint_aware` or `name_only`.
    pub resolver: ResolverMode,
}

impl Default for RequirementsConfig {
    fn default() -> Self {
        Self {
            module_roots: Vec::new(),
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            requirements_file: DEFAULT_REQUIREMENTS_FILE.to_string(),
            resolver: ResolverMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Interpreter used for `pip list` and the default install command.
    pub python: String,

    /// Install command prefix; the spec is appended as the last argument.
    /// Defaults to `<python> -m pip install`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    /// Per-spec timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            python: default_python().to_string(),
            command: None,
            timeout_secs: 300,
        }
    }
}

impl InstallerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The full install argv prefix.
    pub fn command_argv(&self) -> Vec<String> {
        match &self.command {
            Some(argv) if !argv.is_empty() => argv.clone(),
            _ => vec![
                self.python.clone(),
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Server log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Lines to tail when none are requested.
    pub tail_lines: usize,

    /// Backward read size in bytes.
    pub chunk_size: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            file: None,
            tail_lines: DEFAULT_TAIL_LINES,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MedicConfig {
    /// Make relative paths absolute against the project root.
    pub fn resolve_paths(&mut self, project_root: &Path) {
        for root in &mut self.requirements.module_roots {
            if root.is_relative() {
                *root = project_root.join(&*root);
            }
        }
        if let Some(file) = &mut self.logs.file {
            if file.is_relative() {
                *file = project_root.join(&*file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: MedicConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, MedicConfig::default());
        assert_eq!(config.requirements.marker_file, "__manifest__.py");
        assert_eq!(config.installer.timeout_secs, 300);
        assert_eq!(config.logs.tail_lines, 200);
        assert_eq!(config.logs.chunk_size, 4096);
    }

    #[test]
    fn parses_full_config() {
        let yaml = r#"
settings:
  default_output: quiet
requirements:
  module_roots: [addons, /opt/extra]
  resolver: name_only
installer:
  python: /usr/bin/python3.11
  timeout_secs: 60
logs:
  file: var/log/server.log
  tail_lines: 50
"#;
        let config: MedicConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settings.default_output, OutputMode::Quiet);
        assert_eq!(config.requirements.resolver, ResolverMode::NameOnly);
        assert_eq!(config.requirements.module_roots.len(), 2);
        assert_eq!(config.installer.timeout(), Duration::from_secs(60));
        assert_eq!(
            config.installer.command_argv(),
            vec!["/usr/bin/python3.11", "-m", "pip", "install"]
        );
        assert_eq!(config.logs.tail_lines, 50);
    }

    #[test]
    fn custom_install_command() {
        let yaml = "installer:\n  command: [uv, pip, install]\n";
        let config: MedicConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.installer.command_argv(), vec!["uv", "pip", "install"]);
    }

    #[test]
    fn resolve_paths_keeps_absolute() {
        let mut config = MedicConfig::default();
        config.requirements.module_roots = vec![PathBuf::from("addons"), PathBuf::from("/abs")];
        config.logs.file = Some(PathBuf::from("server.log"));

        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.requirements.module_roots,
            vec![PathBuf::from("/project/addons"), PathBuf::from("/abs")]
        );
        assert_eq!(config.logs.file, Some(PathBuf::from("/project/server.log")));
    }

    #[test]
    fn rejects_unknown_resolver() {
        let yaml = "requirements:\n  resolver: fuzzy\n";
        assert!(serde_yaml::from_str::<MedicConfig>(yaml).is_err());
    }
}
