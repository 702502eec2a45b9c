//! Declared-requirement discovery, resolution and installation.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`scanner`] finds modules and reads their requirements files
//! 2. [`resolver`] classifies each requirement against a [`PackageRegistry`]
//!    (with [`analysis`] partitioning the results for a whole scan)
//! 3. [`installer`] hands the unmet ones to a [`PackageInstaller`]
//!
//! # Modules
//!
//! - [`spec`] - Requirement spec parsing and name normalization
//! - [`version`] - Version ordering and specifier sets
//! - [`status`] - Resolution outcomes
//! - [`registry`] - Installed-package lookups

pub mod analysis;
pub mod installer;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod spec;
pub mod status;
pub mod version;

pub use analysis::{analyze, DependencyAnalysis, ResolvedRequirement};
pub use installer::{
    CommandInstaller, InstallEvent, InstallOutput, InstallReport, InstallationOrchestrator,
    InstallationResult, PackageInstaller, DEFAULT_INSTALL_TIMEOUT,
};
pub use registry::{PackageRegistry, PipRegistry, StaticRegistry};
pub use resolver::{
    ConstraintAware, NameOnly, Resolution, ResolverMode, VersionMatcher, VersionResolver,
};
pub use scanner::{
    parse_requirements, ModuleRequirementSet, RequirementScanner, ScanOptions, ScanReport,
};
pub use spec::{normalize_name, RequirementSpec};
pub use status::ResolutionOutcome;
pub use version::{Specifier, SpecifierSet, Version};
