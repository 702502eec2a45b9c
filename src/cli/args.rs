//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Medic - module dependency and server log diagnostics.
#[derive(Debug, Parser)]
#[command(name = "medic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .medic/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check declared module requirements against installed packages (default)
    Scan(ScanArgs),

    /// Install missing or conflicting module requirements
    Install(InstallArgs),

    /// Show the tail of the server log, optionally with diagnostics
    Logs(LogsArgs),
}

/// Arguments for the `scan` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Module root to scan (repeatable; replaces configured roots)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Only check that packages are installed, ignoring version constraints
    #[arg(long)]
    pub name_only: bool,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, Args)]
pub struct InstallArgs {
    /// Module root to scan (repeatable; replaces configured roots)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Only check that packages are installed, ignoring version constraints
    #[arg(long)]
    pub name_only: bool,

    /// Per-package timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Show what would be installed without installing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `logs` command.
#[derive(Debug, Clone, Default, Args)]
pub struct LogsArgs {
    /// Log file (overrides logs.file)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of lines to read from the end of the file
    #[arg(short = 'n', long, value_name = "LINES")]
    pub lines: Option<usize>,

    /// Level filter: all, debug, info, warning, error, critical, test
    #[arg(long, default_value = "all")]
    pub level: String,

    /// Case-insensitive keyword filter
    #[arg(long, value_name = "KEYWORD")]
    pub grep: Option<String>,

    /// Match the lines against known failure patterns
    #[arg(long)]
    pub diagnose: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
