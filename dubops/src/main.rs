//! Dub CLI - isochronic dubbing tool

use clap::Parser;
use dubops::cli::{Cli, run_cli};
use eyre::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    run_cli(Cli::parse())
}
