//! css-rebaser: rebase url() references in compiled CSS using its source map.

mod cli;
mod config;
mod error;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match orchestrator::run(args).await {
        Ok(summary) => {
            tracing::debug!(?summary, "done");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs to stderr, filtered by `RUST_LOG` unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
