//! External process execution and platform helpers.

pub mod command;
pub mod platform;

pub use command::{display_command, execute, CommandOptions, CommandResult};
pub use platform::{default_python, is_ci};
