//! Install command implementation.
//!
//! The `medic install` command runs the same check as `medic scan`, then
//! hands every missing or conflicting requirement to the package installer.

use std::time::Duration;

use super::dispatcher::{Command, CommandResult};
use super::scan::{check_requirements, render_analysis};
use crate::cli::args::InstallArgs;
use crate::config::MedicConfig;
use crate::error::Result;
use crate::requirements::{
    CommandInstaller, InstallEvent, InstallationOrchestrator, InstallationResult,
    PackageInstaller, PackageRegistry, PipRegistry,
};
use crate::ui::{OutputMode, SpinnerHandle, UserInterface};

/// The install command.
pub struct InstallCommand {
    config: MedicConfig,
    args: InstallArgs,
    registry: Box<dyn PackageRegistry>,
    installer: Box<dyn PackageInstaller>,
}

impl InstallCommand {
    /// Create an install command from the configured interpreter and command.
    pub fn new(config: &MedicConfig, args: InstallArgs) -> Self {
        let registry = Box::new(PipRegistry::new(config.installer.python.clone()));
        let installer = Box::new(CommandInstaller::new(config.installer.command_argv()));
        Self::with_backends(config, args, registry, installer)
    }

    /// Create an install command with specific registry and installer.
    pub fn with_backends(
        config: &MedicConfig,
        args: InstallArgs,
        registry: Box<dyn PackageRegistry>,
        installer: Box<dyn PackageInstaller>,
    ) -> Self {
        Self {
            config: config.clone(),
            args,
            registry,
            installer,
        }
    }

    fn timeout(&self) -> Duration {
        self.args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.installer.timeout())
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let check = check_requirements(
            &self.config,
            &self.args.roots,
            self.args.name_only,
            self.registry.as_ref(),
        );
        let analysis = &check.analysis;

        ui.show_header("Module dependencies");
        render_analysis(analysis, ui);

        let specs = analysis.install_specs();
        if specs.is_empty() {
            if analysis.errors.is_empty() {
                ui.success("Nothing to install.");
                return Ok(CommandResult::success());
            }
            ui.error("Some requirements could not be checked; nothing was installed.");
            return Ok(CommandResult::failure(1));
        }

        if self.args.dry_run {
            ui.message(&format!("Would install {} package(s):", specs.len()));
            for spec in &specs {
                ui.message(&format!("  {}", spec));
            }
            return Ok(CommandResult::success());
        }

        ui.show_header("Installing");
        let orchestrator =
            InstallationOrchestrator::new(self.installer.as_ref()).with_timeout(self.timeout());

        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let report = orchestrator.install_all_with(&specs, &mut |event: InstallEvent<'_>| {
            match event {
                InstallEvent::Started { spec, index, total } => {
                    spinner = Some(
                        ui.start_spinner(&format!("[{}/{}] Installing {}", index, total, spec)),
                    );
                }
                InstallEvent::Finished { spec, result } => {
                    if let Some(mut handle) = spinner.take() {
                        match result {
                            InstallationResult::Success => {
                                handle.finish_success(&format!("{} installed", spec))
                            }
                            InstallationResult::Failure { reason, .. } => {
                                handle.finish_error(&format!("{}: {}", spec, reason))
                            }
                        }
                    }
                }
            }
        });

        if ui.output_mode() == OutputMode::Verbose {
            for line in &report.log_lines {
                ui.detail(line);
            }
        }

        for spec in &report.successes {
            ui.success(&format!("Installed {}", spec));
        }
        for (spec, reason) in &report.failures {
            let first = reason.lines().next().unwrap_or_default();
            ui.error(&format!("Failed to install {}: {}", spec, first));
        }

        let checked_ok = analysis.errors.is_empty();
        if report.has_failures() || !checked_ok {
            if !checked_ok {
                ui.warning(&format!(
                    "{} requirement(s) could not be checked.",
                    analysis.errors.len()
                ));
            }
            Ok(CommandResult::failure(1))
        } else {
            ui.success(&format!("{} package(s) installed.", report.successes.len()));
            Ok(CommandResult::success())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::{InstallOutput, StaticRegistry};
    use crate::ui::MockUI;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Installer that fails any spec containing "broken" and records calls.
    #[derive(Default)]
    struct RecordingInstaller {
        calls: RefCell<Vec<String>>,
    }

    impl PackageInstaller for RecordingInstaller {
        fn describe(&self) -> String {
            "recording".to_string()
        }

        fn install(&self, spec: &str, _timeout: Duration) -> Result<InstallOutput> {
            self.calls.borrow_mut().push(spec.to_string());
            let exit_code = if spec.contains("broken") { 1 } else { 0 };
            Ok(InstallOutput::Completed {
                exit_code: Some(exit_code),
                stdout: format!("processing {}", spec),
                stderr: String::new(),
            })
        }
    }

    fn project(requirements: &[(&str, &str)]) -> (TempDir, MedicConfig) {
        let temp = TempDir::new().unwrap();
        for (name, content) in requirements {
            let dir = temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("__manifest__.py"), "{}").unwrap();
            fs::write(dir.join("requirements.txt"), content).unwrap();
        }
        let mut config = MedicConfig::default();
        config.requirements.module_roots = vec![temp.path().to_path_buf()];
        (temp, config)
    }

    fn registry() -> Box<StaticRegistry> {
        Box::new(StaticRegistry::new().with_package("libfoo", "1.5.0"))
    }

    #[test]
    fn nothing_to_install() {
        let (_temp, config) = project(&[("sale", "libfoo\n")]);
        let cmd = InstallCommand::with_backends(
            &config,
            InstallArgs::default(),
            registry(),
            Box::new(RecordingInstaller::default()),
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("Nothing to install."));
    }

    #[test]
    fn dry_run_lists_specs_once() {
        let (_temp, config) = project(&[("sale", "libbar\n"), ("stock", "libbar\nlibbaz\n")]);
        let args = InstallArgs {
            dry_run: true,
            ..Default::default()
        };
        let cmd = InstallCommand::with_backends(
            &config,
            args,
            registry(),
            Box::new(RecordingInstaller::default()),
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Would install 2 package(s):"));
        assert!(ui.spinners().is_empty());
    }

    #[test]
    fn installs_and_reports_failures() {
        let (_temp, config) = project(&[("sale", "libbar\nbroken-pkg\nlibfoo\n")]);
        let cmd = InstallCommand::with_backends(
            &config,
            InstallArgs::default(),
            registry(),
            Box::new(RecordingInstaller::default()),
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_success("Installed libbar"));
        assert!(ui.has_error("Failed to install broken-pkg: Exit code: 1"));
        assert_eq!(
            ui.spinners(),
            &[
                "[1/2] Installing libbar".to_string(),
                "[2/2] Installing broken-pkg".to_string()
            ]
        );
    }

    #[test]
    fn verbose_mode_shows_installer_log() {
        let (_temp, config) = project(&[("sale", "libbar\n")]);
        let cmd = InstallCommand::with_backends(
            &config,
            InstallArgs::default(),
            registry(),
            Box::new(RecordingInstaller::default()),
        );
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_detail("Using installer: recording"));
        assert!(ui.has_detail("processing libbar"));
        assert!(ui.has_success("1 package(s) installed."));
    }

    #[test]
    fn timeout_flag_overrides_config() {
        let (_temp, config) = project(&[]);
        let args = InstallArgs {
            timeout: Some(7),
            ..Default::default()
        };
        let cmd = InstallCommand::with_backends(
            &config,
            args,
            registry(),
            Box::new(RecordingInstaller::default()),
        );
        assert_eq!(cmd.timeout(), Duration::from_secs(7));
    }
}
