//! Configuration loading for medic.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use medic::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".medic");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "logs:\n  tail_lines: 50\n").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! assert_eq!(config.logs.tail_lines, 50);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_or_default, load_config_value,
    load_merged_config, parse_config, ConfigPaths, CONFIG_DIR,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{InstallerConfig, LogsConfig, MedicConfig, RequirementsConfig, Settings};
