//! Medic CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use medic::cli::{Cli, CommandDispatcher};
use medic::config::{find_project_root, load_config_or_default};
use medic::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout carries reports and JSON.
fn init_tracing(debug: bool, ansi: bool) {
    let filter = if debug {
        EnvFilter::new("medic=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medic=info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, !cli.no_color);

    tracing::debug!("medic starting with args: {:?}", cli);

    // Determine project root
    let project_root = cli.project.clone().unwrap_or_else(|| {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        find_project_root(&cwd).unwrap_or(cwd)
    });

    let config = load_config_or_default(&project_root, cli.config.as_deref());

    // Flags win over the configured default
    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        config
            .as_ref()
            .map(|c| c.settings.default_output)
            .unwrap_or_default()
    };

    let mut ui = create_ui(output_mode, cli.no_color);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(project_root, config);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
