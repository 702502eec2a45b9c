//! Requirement status types for resolution results.
//!
//! Each resolved requirement produces exactly one [`ResolutionOutcome`].

use serde::Serialize;

/// The result of checking a single requirement against the installed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Installed and, when a constraint was declared, within it.
    Satisfied {
        /// The installed version.
        installed: String,
    },

    /// Not installed at all.
    Missing,

    /// Installed, but the installed version fails the declared constraint.
    VersionConflict {
        /// The installed version.
        installed: String,
        /// The declared constraint, e.g. `>=1.2,<2.0`.
        required: String,
    },

    /// The requirement could not be checked (unparseable spec, registry
    /// failure, or an installed version that cannot be compared).
    CheckError {
        /// Why the check failed.
        reason: String,
    },
}

impl ResolutionOutcome {
    /// Whether the requirement is met.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ResolutionOutcome::Satisfied { .. })
    }

    /// Whether the requirement should be forwarded for installation.
    pub fn needs_install(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::Missing | ResolutionOutcome::VersionConflict { .. }
        )
    }

    /// Whether the check itself failed.
    pub fn is_error(&self) -> bool {
        matches!(self, ResolutionOutcome::CheckError { .. })
    }

    /// Short human-readable status.
    pub fn describe(&self) -> String {
        match self {
            ResolutionOutcome::Satisfied { installed } => format!("Installed: {}", installed),
            ResolutionOutcome::Missing => "Not installed".to_string(),
            ResolutionOutcome::VersionConflict {
                installed,
                required,
            } => format!(
                "Version conflict: Installed {}, Required {}",
                installed, required
            ),
            ResolutionOutcome::CheckError { reason } => format!("Error checking: {}", reason),
        }
    }
}
