//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, ScanArgs};
use crate::config::MedicConfig;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    config: MedicConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher for a project and its loaded configuration.
    pub fn new(project_root: PathBuf, config: MedicConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &MedicConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    ///
    /// Without a subcommand, `scan` runs with default arguments.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        tracing::debug!(root = %self.project_root.display(), "dispatching command");
        match &cli.command {
            Some(Commands::Scan(args)) => {
                let cmd = super::scan::ScanCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Install(args)) => {
                let cmd = super::install::InstallCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Logs(args)) => {
                let cmd = super::logs::LogsCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = super::scan::ScanCommand::new(&self.config, ScanArgs::default());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_stores_project_root() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf(), MedicConfig::default());
        assert_eq!(dispatcher.project_root(), temp.path());
    }

    #[test]
    fn logs_without_configured_file_fails() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf(), MedicConfig::default());
        let cli = Cli::parse_from(["medic", "logs"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("not configured"));
    }

    #[test]
    fn default_command_scans_configured_roots() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf(), MedicConfig::default());
        let cli = Cli::parse_from(["medic"]);
        let mut ui = MockUI::new();

        // No roots configured: nothing to check, so the scan is healthy.
        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_detail("No 'requirements.txt' files found"));
    }
}
