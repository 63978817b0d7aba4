// src/main.rs
use anyhow::Result;
use clap::Parser;

use songspectra::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Per-track failures are already in the summary; only batch-level
    // problems make the process fail.
    cli::run(&args)?;
    Ok(())
}
