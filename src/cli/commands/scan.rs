//! Scan command implementation.
//!
//! The `medic scan` command discovers modules, resolves their declared
//! requirements against the installed packages, and reports what is missing.

use std::path::PathBuf;

use serde::Serialize;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::ScanArgs;
use crate::config::MedicConfig;
use crate::error::Result;
use crate::requirements::{
    analyze, DependencyAnalysis, PackageRegistry, PipRegistry, RequirementScanner, ResolverMode,
    ScanOptions, ScanReport, VersionResolver,
};
use crate::ui::UserInterface;

/// The scan and its analysis, as printed by `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct RequirementsCheck {
    pub scan: ScanReport,
    pub analysis: DependencyAnalysis,
}

/// Scan module roots and resolve everything they declare.
///
/// Non-empty `root_override` replaces the configured roots.
pub(crate) fn check_requirements(
    config: &MedicConfig,
    root_override: &[PathBuf],
    name_only: bool,
    registry: &dyn PackageRegistry,
) -> RequirementsCheck {
    let roots = if root_override.is_empty() {
        config.requirements.module_roots.as_slice()
    } else {
        root_override
    };
    let scanner = RequirementScanner::new(ScanOptions {
        marker_file: config.requirements.marker_file.clone(),
        requirements_file: config.requirements.requirements_file.clone(),
    });
    let scan = scanner.scan(roots);

    let mode = if name_only {
        ResolverMode::NameOnly
    } else {
        config.requirements.resolver
    };
    let resolver = VersionResolver::new(mode, registry);
    tracing::debug!(matcher = resolver.matcher_name(), "resolving requirements");
    let analysis = analyze(&scan, &resolver);

    RequirementsCheck { scan, analysis }
}

/// Print the analysis: the full report in detail modes, the verdict otherwise.
pub(crate) fn render_analysis(analysis: &DependencyAnalysis, ui: &mut dyn UserInterface) {
    if ui.output_mode().shows_details() {
        for line in &analysis.summary_lines {
            ui.detail(line);
        }
    } else if let Some(verdict) = analysis.summary_lines.last() {
        ui.message(verdict);
    }
}

/// The scan command.
pub struct ScanCommand {
    config: MedicConfig,
    args: ScanArgs,
    registry: Box<dyn PackageRegistry>,
}

impl ScanCommand {
    /// Create a scan command that queries pip with the configured interpreter.
    pub fn new(config: &MedicConfig, args: ScanArgs) -> Self {
        let registry = Box::new(PipRegistry::new(config.installer.python.clone()));
        Self::with_registry(config, args, registry)
    }

    /// Create a scan command with a specific registry.
    pub fn with_registry(
        config: &MedicConfig,
        args: ScanArgs,
        registry: Box<dyn PackageRegistry>,
    ) -> Self {
        Self {
            config: config.clone(),
            args,
            registry,
        }
    }

    pub fn args(&self) -> &ScanArgs {
        &self.args
    }
}

impl Command for ScanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let check = check_requirements(
            &self.config,
            &self.args.roots,
            self.args.name_only,
            self.registry.as_ref(),
        );

        if self.args.json {
            let json = serde_json::to_string_pretty(&check).map_err(anyhow::Error::from)?;
            ui.data(&json);
        } else {
            ui.show_header("Module dependencies");
            render_analysis(&check.analysis, ui);
        }

        if check.analysis.is_healthy() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
