//! Dependency analysis over a scan.

use crate::diagnostics::Diagnostics;
use crate::requirements::resolver::{Resolution, VersionResolver};
use crate::requirements::scanner::ScanReport;
use serde::Serialize;
use std::collections::HashSet;

/// A resolution tagged with the module that declared it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRequirement {
    pub module: String,
    #[serde(flatten)]
    pub resolution: Resolution,
}

/// Partitioned resolution results for a whole scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyAnalysis {
    /// Missing or conflicting requirements, in declaration order.
    pub to_install: Vec<ResolvedRequirement>,
    /// Requirements already met.
    pub satisfied: Vec<ResolvedRequirement>,
    /// Requirements that could not be checked.
    pub errors: Vec<ResolvedRequirement>,
    /// Human-readable report.
    pub summary_lines: Vec<String>,
    /// Diagnostics from the resolver.
    pub diagnostics: Diagnostics,
}

impl DependencyAnalysis {
    /// Specs to hand to the installer, each at most once.
    pub fn install_specs(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.to_install
            .iter()
            .map(|r| r.resolution.spec.clone())
            .filter(|spec| seen.insert(spec.clone()))
            .collect()
    }

    /// Whether everything discovered is satisfied.
    pub fn is_healthy(&self) -> bool {
        self.to_install.is_empty() && self.errors.is_empty()
    }
}

/// Resolve every requirement in the scan and build the summary.
pub fn analyze(scan: &ScanReport, resolver: &VersionResolver<'_>) -> DependencyAnalysis {
    let mut analysis = DependencyAnalysis::default();
    let file = &scan.requirements_file;

    if scan.modules.is_empty() {
        analysis
            .summary_lines
            .push(format!("No '{}' files found in any scanned module.", file));
        return analysis;
    }

    analysis.summary_lines.push(format!(
        "Found '{}' in {} module(s). Analyzing dependencies...",
        file,
        scan.modules.len()
    ));
    analysis.summary_lines.push(String::new());

    for module in &scan.modules {
        analysis
            .summary_lines
            .push(format!("Module: '{}'", module.module));
        if module.packages.is_empty() {
            analysis
                .summary_lines
                .push(format!("  - No packages listed in its {}.", file));
            analysis.summary_lines.push(String::new());
            continue;
        }

        for raw in &module.packages {
            let resolution = resolver.resolve(raw, &mut analysis.diagnostics);
            let outcome = &resolution.outcome;
            let line = if outcome.is_satisfied() {
                format!("  - ✓ {} ({})", resolution.spec, outcome.describe())
            } else if outcome.needs_install() {
                format!(
                    "  - ⚠ {} (Required: {}, Status: {}) - Marked for installation.",
                    resolution.spec,
                    resolution.required_display(),
                    outcome.describe()
                )
            } else {
                format!(
                    "  - ✗ {} (Error during check: {})",
                    resolution.spec,
                    outcome.describe()
                )
            };
            analysis.summary_lines.push(line);

            let entry = ResolvedRequirement {
                module: module.module.clone(),
                resolution,
            };
            if entry.resolution.outcome.is_satisfied() {
                analysis.satisfied.push(entry);
            } else if entry.resolution.outcome.needs_install() {
                analysis.to_install.push(entry);
            } else {
                analysis.errors.push(entry);
            }
        }
        analysis.summary_lines.push(String::new());
    }

    if analysis.is_healthy() {
        analysis
            .summary_lines
            .push("All discovered dependencies are satisfied.".to_string());
    } else if !analysis.to_install.is_empty() {
        analysis.summary_lines.push(format!(
            "Found {} package(s) that need installation or update.",
            analysis.to_install.len()
        ));
    }
    if !analysis.errors.is_empty() {
        analysis.summary_lines.push(format!(
            "Encountered {} error(s) while checking package statuses.",
            analysis.errors.len()
        ));
    }

    analysis
}
