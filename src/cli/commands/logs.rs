//! Logs command implementation.
//!
//! The `medic logs` command tails the server log, filters it by level and
//! keyword, and optionally matches the result against known failures.

use serde::Serialize;

use super::dispatcher::{Command, CommandResult};
use crate::cli::args::LogsArgs;
use crate::config::MedicConfig;
use crate::error::Result;
use crate::logs::{
    DiagnosticHint, LevelFilter, LogAnalyzer, LogQuery, LogReport, LogStatus, LogTailer,
};
use crate::ui::UserInterface;

#[derive(Debug, Serialize)]
struct LogsOutput<'a> {
    #[serde(flatten)]
    report: &'a LogReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    hints: Option<&'a [DiagnosticHint]>,
}

/// The logs command.
pub struct LogsCommand {
    config: MedicConfig,
    args: LogsArgs,
}

impl LogsCommand {
    pub fn new(config: &MedicConfig, args: LogsArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }

    fn query(&self) -> Result<LogQuery> {
        let level = if self.args.level.trim().is_empty() {
            LevelFilter::All
        } else {
            self.args.level.parse()?
        };
        Ok(LogQuery {
            lines: self.args.lines.unwrap_or(self.config.logs.tail_lines),
            level,
            keyword: self.args.grep.clone(),
        })
    }

    fn analyzer(&self) -> LogAnalyzer {
        let path = self
            .args
            .file
            .clone()
            .or_else(|| self.config.logs.file.clone());
        LogAnalyzer::new(path).with_tailer(LogTailer::new(self.config.logs.chunk_size))
    }
}

impl Command for LogsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let query = self.query()?;
        let analyzer = self.analyzer();
        let report = analyzer.fetch(&query);

        let hints = (self.args.diagnose && report.status == LogStatus::Success)
            .then(|| analyzer.diagnose(&report.lines));

        if self.args.json {
            let output = LogsOutput {
                report: &report,
                hints: hints.as_deref(),
            };
            let json = serde_json::to_string_pretty(&output).map_err(anyhow::Error::from)?;
            ui.data(&json);
        } else {
            render_report(&report, hints.as_deref(), ui);
        }

        match report.status {
            LogStatus::NoLogFile | LogStatus::ErrorReading => Ok(CommandResult::failure(1)),
            _ => Ok(CommandResult::success()),
        }
    }
}

fn render_report(
    report: &LogReport,
    hints: Option<&[DiagnosticHint]>,
    ui: &mut dyn UserInterface,
) {
    let message = report.message.as_deref().unwrap_or_default();
    match report.status {
        LogStatus::Success => {
            if let Some(path) = &report.path {
                ui.show_header(&format!("{} ({} lines)", path.display(), report.lines.len()));
            }
            for line in &report.lines {
                ui.data(line);
            }
        }
        LogStatus::Empty | LogStatus::EmptyAfterFilter => ui.warning(message),
        LogStatus::NoLogFile | LogStatus::ErrorReading => ui.error(message),
    }

    if let Some(hints) = hints {
        ui.show_header("Diagnostics");
        for hint in hints {
            ui.hint(&hint.to_string());
        }
    }
}
