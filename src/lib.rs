//! Medic - module dependency checking and server log diagnostics.
//!
//! Medic answers two questions about a deployed application: are the Python
//! packages its modules declare actually installed, and what does the tail
//! of the server log say went wrong?
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and merging
//! - [`diagnostics`] - Per-operation diagnostic collection
//! - [`error`] - Error types and result aliases
//! - [`logs`] - Log tailing, filtering and failure-pattern matching
//! - [`requirements`] - Requirement scanning, resolution and installation
//! - [`shell`] - External process execution
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use medic::diagnostics::Diagnostics;
//! use medic::requirements::{ResolverMode, StaticRegistry, VersionResolver};
//!
//! let registry = StaticRegistry::new().with_package("libfoo", "2.1.0");
//! let resolver = VersionResolver::new(ResolverMode::ConstraintAware, &registry);
//! let mut diagnostics = Diagnostics::new();
//!
//! let resolution = resolver.resolve("libfoo>=1.2,<2.0", &mut diagnostics);
//! assert!(resolution.outcome.needs_install());
//! ```
//!
//! For file-based scanning and log analysis, see the integration tests.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logs;
pub mod requirements;
pub mod shell;
pub mod ui;

pub use error::{MedicError, Result};
