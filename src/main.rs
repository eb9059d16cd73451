//! compat-probe CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use compat_probe::cli::{Cli, CommandDispatcher};
use compat_probe::ui::{should_use_colors, OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO, or WARN with `--quiet`
fn init_tracing(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("compat_probe=debug")
    } else {
        let fallback = if quiet {
            "compat_probe=warn"
        } else {
            "compat_probe=info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.quiet);

    tracing::debug!("compat-probe starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.debug, cli.quiet);
    let colors = !cli.no_color && should_use_colors();
    let mut ui = TerminalUI::new(output_mode, colors);

    let dispatcher = CommandDispatcher::from_cli(&cli);

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
