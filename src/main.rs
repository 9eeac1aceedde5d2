use std::process::ExitCode;

use clap::Parser;
use lossplot::cli::Cli;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // logs go to stderr so terminal charts on stdout stay readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lossplot=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "aborting");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
