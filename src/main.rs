// Entrypoint for the CLI application.
// Keeps `main` small: parse arguments, install logging, run one command and
// turn any error into exit status 1. stdout only ever carries the JSON result.

use clap::Parser;
use clawbounty::cli::{run, Cli};
use clawbounty::error::CliError;
use crossterm::style::{style, Stylize};
use crossterm::tty::IsTty;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

fn main() {
    let cli = Cli::parse();
    let colour = std::io::stderr().is_tty();
    setup_logging(cli.debug, colour);

    if let Err(e) = run(&cli) {
        eprintln!("{}", error_line(e, colour));
        std::process::exit(1);
    }
}

/// Usage errors are the usage line itself; anything else gets an `Error:`
/// prefix with its cause chain, red only when stderr is a terminal.
fn error_line(err: CliError, colour: bool) -> String {
    match err {
        CliError::Usage(usage) => usage,
        other => {
            let line = format!("Error: {:#}", anyhow::Error::from(other));
            if colour {
                style(line).red().to_string()
            } else {
                line
            }
        }
    }
}

fn setup_logging(verbosity: u8, colour: bool) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(colour)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    tracing::debug!(?filter, "logging initialized");
}
