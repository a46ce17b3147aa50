use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use geotz::cli::{Cli, Commands};
use geotz::commands::{build, lookup};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "geotz=info",
        1 => "geotz=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Build(args) => build::run(&cli, args),
        Commands::Lookup(args) => lookup::run(&cli, args),
    }
}
