//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands take their backends
//! (package registry, installer) as trait objects so tests can substitute
//! them and capture output with [`MockUI`](crate::ui::MockUI).

pub mod dispatcher;
pub mod install;
pub mod logs;
pub mod scan;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use install::InstallCommand;
pub use logs::LogsCommand;
pub use scan::ScanCommand;
