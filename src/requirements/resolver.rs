//! Requirement resolution against the installed-package registry.
//!
//! The comparison strategy is injected through [`VersionMatcher`]:
//!
//! - [`ConstraintAware`] parses the full spec and evaluates its constraint
//! - [`NameOnly`] strips any version suffix and only checks presence
//!
//! Resolution never fails: every raw requirement comes back classified.

use crate::diagnostics::Diagnostics;
use crate::requirements::registry::PackageRegistry;
use crate::requirements::spec::RequirementSpec;
use crate::requirements::status::ResolutionOutcome;
use crate::requirements::version::Version;
use serde::{Deserialize, Serialize};

/// Which matcher to use for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    /// Evaluate declared version constraints.
    #[default]
    ConstraintAware,
    /// Presence only; constraints are ignored.
    NameOnly,
}

/// A classified requirement.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The requirement as written in the requirements file.
    pub spec: String,
    /// Normalized package name, when one could be extracted.
    pub package: Option<String>,
    /// The declared constraint, when one was honored.
    pub required: Option<String>,
    /// The outcome.
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    fn check_error(spec: &str, package: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            spec: spec.trim().to_string(),
            package,
            required: None,
            outcome: ResolutionOutcome::CheckError {
                reason: reason.into(),
            },
        }
    }

    /// The constraint for display, `"any version"` when none applies.
    pub fn required_display(&self) -> &str {
        self.required.as_deref().unwrap_or("any version")
    }
}

/// Strategy for deciding whether an installed package satisfies a spec.
pub trait VersionMatcher {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Classify one raw requirement.
    fn resolve(
        &self,
        raw: &str,
        registry: &dyn PackageRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Resolution;
}

/// Build the matcher for a mode.
pub fn matcher_for(mode: ResolverMode) -> Box<dyn VersionMatcher> {
    match mode {
        ResolverMode::ConstraintAware => Box::new(ConstraintAware),
        ResolverMode::NameOnly => Box::new(NameOnly),
    }
}

/// Full constraint evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintAware;

impl VersionMatcher for ConstraintAware {
    fn name(&self) -> &'static str {
        "constraint_aware"
    }

    fn resolve(
        &self,
        raw: &str,
        registry: &dyn PackageRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Resolution {
        let spec = match RequirementSpec::parse(raw) {
            Ok(spec) => spec,
            Err(err) => {
                diagnostics.warning(format!(
                    "Invalid package spec: {} ({}). Treating as simple name.",
                    raw.trim(),
                    err
                ));
                match RequirementSpec::name_only(raw) {
                    Ok(spec) => spec,
                    Err(err) => return Resolution::check_error(raw, None, err.to_string()),
                }
            }
        };

        let package = spec.normalized_name().to_string();
        let required = spec.specifiers().map(|s| s.to_string());

        let installed = match registry.installed_version(&package) {
            Ok(installed) => installed,
            Err(err) => {
                diagnostics.error(format!(
                    "Error checking package '{}' (from spec '{}'): {}",
                    package,
                    spec.raw(),
                    err
                ));
                return Resolution::check_error(raw, Some(package), err.to_string());
            }
        };

        let outcome = match (installed, spec.specifiers()) {
            (None, _) => ResolutionOutcome::Missing,
            (Some(installed), None) => ResolutionOutcome::Satisfied { installed },
            (Some(installed), Some(constraint)) => match Version::parse(&installed) {
                Ok(version) if constraint.contains(&version) => {
                    ResolutionOutcome::Satisfied { installed }
                }
                Ok(_) => ResolutionOutcome::VersionConflict {
                    installed,
                    required: constraint.to_string(),
                },
                Err(err) => ResolutionOutcome::CheckError {
                    reason: format!("installed version is not comparable: {}", err),
                },
            },
        };

        tracing::debug!(spec = spec.raw(), outcome = ?outcome, "resolved");

        Resolution {
            spec: spec.raw().to_string(),
            package: Some(package),
            required,
            outcome,
        }
    }
}

/// Presence-only matching used when constraints should not be evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameOnly;

impl VersionMatcher for NameOnly {
    fn name(&self) -> &'static str {
        "name_only"
    }

    fn resolve(
        &self,
        raw: &str,
        registry: &dyn PackageRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Resolution {
        let spec = match RequirementSpec::name_only(raw) {
            Ok(spec) => spec,
            Err(err) => return Resolution::check_error(raw, None, err.to_string()),
        };
        let package = spec.normalized_name().to_string();

        let outcome = match registry.installed_version(&package) {
            Ok(Some(installed)) => ResolutionOutcome::Satisfied { installed },
            Ok(None) => ResolutionOutcome::Missing,
            Err(err) => {
                diagnostics.error(format!("Error checking package '{}': {}", package, err));
                ResolutionOutcome::CheckError {
                    reason: err.to_string(),
                }
            }
        };

        Resolution {
            spec: spec.raw().to_string(),
            package: Some(package),
            required: None,
            outcome,
        }
    }
}

/// Resolves raw requirements with an injected matcher and registry.
pub struct VersionResolver<'a> {
    matcher: Box<dyn VersionMatcher>,
    registry: &'a dyn PackageRegistry,
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver for the given mode.
    pub fn new(mode: ResolverMode, registry: &'a dyn PackageRegistry) -> Self {
        Self::with_matcher(matcher_for(mode), registry)
    }

    /// Create a resolver with a custom matcher.
    pub fn with_matcher(matcher: Box<dyn VersionMatcher>, registry: &'a dyn PackageRegistry) -> Self {
        Self { matcher, registry }
    }

    /// Name of the active matcher.
    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    /// Classify one raw requirement.
    pub fn resolve(&self, raw: &str, diagnostics: &mut Diagnostics) -> Resolution {
        self.matcher.resolve(raw, self.registry, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MedicError, Result};
    use crate::requirements::registry::StaticRegistry;

    struct FailingRegistry;

    impl PackageRegistry for FailingRegistry {
        fn installed_version(&self, _normalized_name: &str) -> Result<Option<String>> {
            Err(MedicError::ExternalToolFailure {
                command: "pip list".to_string(),
                message: "interpreter missing".to_string(),
            })
        }
    }

    fn registry() -> StaticRegistry {
        StaticRegistry::new()
            .with_package("libfoo", "1.5.0")
            .with_package("Old_Lib", "0.9")
            .with_package("weird", "unknown-build")
            .with_package("libpre", "1.5rc1")
    }

    fn resolve(mode: ResolverMode, raw: &str) -> (Resolution, Diagnostics) {
        let registry = registry();
        let resolver = VersionResolver::new(mode, &registry);
        let mut diags = Diagnostics::new();
        let resolution = resolver.resolve(raw, &mut diags);
        (resolution, diags)
    }

    #[test]
    fn satisfied_within_constraint() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "libfoo>=1.2,<2.0");
        assert_eq!(
            res.outcome,
            ResolutionOutcome::Satisfied {
                installed: "1.5.0".to_string()
            }
        );
        assert_eq!(res.required.as_deref(), Some(">=1.2,<2.0"));
    }

    #[test]
    fn missing_when_not_installed() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "libbar");
        assert_eq!(res.outcome, ResolutionOutcome::Missing);
        assert_eq!(res.required_display(), "any version");
    }

    #[test]
    fn conflict_records_installed_and_required() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "old-lib>=1.0");
        assert_eq!(
            res.outcome,
            ResolutionOutcome::VersionConflict {
                installed: "0.9".to_string(),
                required: ">=1.0".to_string(),
            }
        );
    }

    #[test]
    fn installed_prerelease_conflicts_unless_constraint_names_one() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "libpre>=1.0");
        assert_eq!(
            res.outcome,
            ResolutionOutcome::VersionConflict {
                installed: "1.5rc1".to_string(),
                required: ">=1.0".to_string(),
            }
        );

        let (res, _) = resolve(ResolverMode::ConstraintAware, "libpre>=1.0rc1");
        assert!(res.outcome.is_satisfied());

        let (res, _) = resolve(ResolverMode::ConstraintAware, "libpre");
        assert!(res.outcome.is_satisfied());
    }

    #[test]
    fn name_lookup_is_normalized() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "OLD.LIB");
        assert!(res.outcome.is_satisfied());
        assert_eq!(res.package.as_deref(), Some("old-lib"));
    }

    #[test]
    fn malformed_spec_degrades_to_name_lookup() {
        let (res, diags) = resolve(ResolverMode::ConstraintAware, "libfoo>=>1");
        assert!(res.outcome.is_satisfied());
        assert!(res.required.is_none());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn unrecoverable_spec_is_check_error() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "-r base.txt");
        assert!(res.outcome.is_error());
        assert!(res.package.is_none());
    }

    #[test]
    fn uncomparable_installed_version_is_check_error() {
        let (res, _) = resolve(ResolverMode::ConstraintAware, "weird>=1.0");
        assert!(res.outcome.is_error());

        let (res, _) = resolve(ResolverMode::ConstraintAware, "weird");
        assert!(res.outcome.is_satisfied());
    }

    #[test]
    fn name_only_ignores_constraints() {
        let (res, _) = resolve(ResolverMode::NameOnly, "old-lib>=1.0");
        assert_eq!(
            res.outcome,
            ResolutionOutcome::Satisfied {
                installed: "0.9".to_string()
            }
        );
        assert!(res.required.is_none());

        let (res, _) = resolve(ResolverMode::NameOnly, "libbar==2.0");
        assert_eq!(res.outcome, ResolutionOutcome::Missing);
    }

    #[test]
    fn registry_failure_becomes_check_error() {
        let registry = FailingRegistry;
        let resolver = VersionResolver::new(ResolverMode::ConstraintAware, &registry);
        let mut diags = Diagnostics::new();
        let res = resolver.resolve("libfoo", &mut diags);
        assert!(res.outcome.is_error());
        assert!(diags.has_errors());
    }

    #[test]
    fn matcher_names() {
        let registry = registry();
        assert_eq!(
            VersionResolver::new(ResolverMode::NameOnly, &registry).matcher_name(),
            "name_only"
        );
        assert_eq!(
            VersionResolver::new(ResolverMode::ConstraintAware, &registry).matcher_name(),
            "constraint_aware"
        );
    }
}
