//! Sequential installation of unmet requirements.
//!
//! The orchestrator hands each spec to a [`PackageInstaller`] in order,
//! enforcing a per-invocation timeout, and collects a line-oriented log
//! along with the successes and failures.

use crate::error::{MedicError, Result};
use crate::shell::{display_command, execute, CommandOptions};
use serde::Serialize;
use std::time::Duration;

/// Default per-spec installation timeout.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// What one installer invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutput {
    /// The installer ran to completion.
    Completed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The installer was killed after exceeding the timeout.
    TimedOut { stdout: String, stderr: String },
}

/// Invokes a package manager for a single spec.
pub trait PackageInstaller {
    /// Human-readable description of the installer for the log.
    fn describe(&self) -> String;

    /// Install one spec. `Err` means the installer could not be started.
    fn install(&self, spec: &str, timeout: Duration) -> Result<InstallOutput>;
}

/// An installer that runs an argv prefix with the spec appended.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    argv: Vec<String>,
}

impl CommandInstaller {
    /// Create an installer from an argv prefix; the first element is the
    /// program.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// `<python> -m pip install`.
    pub fn pip(python: &str) -> Self {
        Self::new([python, "-m", "pip", "install"])
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl PackageInstaller for CommandInstaller {
    fn describe(&self) -> String {
        self.argv.join(" ")
    }

    fn install(&self, spec: &str, timeout: Duration) -> Result<InstallOutput> {
        let (program, prefix) = match self.argv.split_first() {
            Some(split) => split,
            None => {
                return Err(MedicError::ExternalToolFailure {
                    command: String::new(),
                    message: "installer command is empty".to_string(),
                })
            }
        };

        let mut args = prefix.to_vec();
        args.push(spec.to_string());

        tracing::debug!(command = %display_command(program, &args), "installing");

        let options = CommandOptions {
            timeout: Some(timeout),
        };
        let result = execute(program, &args, &options)?;

        if result.timed_out {
            Ok(InstallOutput::TimedOut {
                stdout: result.stdout,
                stderr: result.stderr,
            })
        } else {
            Ok(InstallOutput::Completed {
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            })
        }
    }
}

/// Outcome of installing one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InstallationResult {
    Success,
    Failure { reason: String, output: String },
}

impl InstallationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallationResult::Success)
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent<'a> {
    /// About to invoke the installer for `spec` (1-based `index` of `total`).
    Started {
        spec: &'a str,
        index: usize,
        total: usize,
    },
    /// The installer finished for `spec`.
    Finished {
        spec: &'a str,
        result: &'a InstallationResult,
    },
}

/// Result of an installation batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    /// Specs installed successfully, in order.
    pub successes: Vec<String>,
    /// Failed specs with the failure reason, in order.
    pub failures: Vec<(String, String)>,
    /// Human-readable log of the batch.
    pub log_lines: Vec<String>,
}

impl InstallReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs an installer over a list of specs, one at a time.
pub struct InstallationOrchestrator<'a> {
    installer: &'a dyn PackageInstaller,
    timeout: Duration,
}

impl<'a> InstallationOrchestrator<'a> {
    /// Create an orchestrator with the default timeout.
    pub fn new(installer: &'a dyn PackageInstaller) -> Self {
        Self {
            installer,
            timeout: DEFAULT_INSTALL_TIMEOUT,
        }
    }

    /// Override the per-spec timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Install every spec in order.
    pub fn install_all(&self, specs: &[String]) -> InstallReport {
        self.install_all_with(specs, &mut |_: InstallEvent<'_>| {})
    }

    /// Install every spec in order, reporting progress to `observer`.
    ///
    /// A failed spec never stops the batch and nothing is retried.
    pub fn install_all_with(
        &self,
        specs: &[String],
        observer: &mut dyn FnMut(InstallEvent<'_>),
    ) -> InstallReport {
        let mut report = InstallReport::default();

        if specs.is_empty() {
            report
                .log_lines
                .push("No packages specified for installation.".to_string());
            return report;
        }

        report
            .log_lines
            .push(format!("Using installer: {}", self.installer.describe()));

        for (idx, spec) in specs.iter().enumerate() {
            observer(InstallEvent::Started {
                spec: spec.as_str(),
                index: idx + 1,
                total: specs.len(),
            });
            report.log_lines.push(String::new());
            report
                .log_lines
                .push(format!("Attempting to install/update: {}...", spec));

            let result = self.install_one(spec, &mut report.log_lines);
            observer(InstallEvent::Finished {
                spec: spec.as_str(),
                result: &result,
            });

            match result {
                InstallationResult::Success => report.successes.push(spec.clone()),
                InstallationResult::Failure { reason, output } => {
                    let detail = if output.is_empty() {
                        reason
                    } else {
                        format!("{}\n{}", reason, output)
                    };
                    report.failures.push((spec.clone(), detail));
                }
            }
        }

        tracing::info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            "installation batch finished"
        );
        report
    }

    fn install_one(&self, spec: &str, log: &mut Vec<String>) -> InstallationResult {
        match self.installer.install(spec, self.timeout) {
            Ok(InstallOutput::Completed {
                exit_code,
                stdout,
                stderr,
            }) => {
                push_output(log, spec, &stdout, &stderr);
                if exit_code == Some(0) {
                    log.push(format!("Successfully processed {}.", spec));
                    InstallationResult::Success
                } else {
                    let code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
                    log.push(format!("Failed to process {}. Exit code: {}", spec, code));
                    InstallationResult::Failure {
                        reason: format!("Exit code: {}", code),
                        output: format!("STDOUT:\n{}\nSTDERR:\n{}", stdout, stderr),
                    }
                }
            }
            Ok(InstallOutput::TimedOut { stdout, stderr }) => {
                log.push(format!(
                    "Timeout expired while trying to install {}.",
                    spec
                ));
                log.push("Killed installer process due to timeout.".to_string());
                tracing::warn!(spec, "installation timed out");
                InstallationResult::Failure {
                    reason: format!(
                        "Installation timed out after {} seconds.",
                        self.timeout.as_secs_f64()
                    ),
                    output: format!("STDOUT:\n{}\nSTDERR:\n{}", stdout, stderr),
                }
            }
            Err(err) => {
                log.push(format!(
                    "An unexpected error occurred while trying to install {}: {}",
                    spec, err
                ));
                InstallationResult::Failure {
                    reason: err.to_string(),
                    output: String::new(),
                }
            }
        }
    }
}

fn push_output(log: &mut Vec<String>, spec: &str, stdout: &str, stderr: &str) {
    log.push(format!("--- STDOUT for {} ---", spec));
    log.extend(stdout.lines().map(str::to_string));
    log.push(format!("--- STDERR for {} ---", spec));
    log.extend(stderr.lines().map(str::to_string));
    log.push("-----------------------------".to_string());
}
