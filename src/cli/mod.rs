// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_summary, print_summary};

use anyhow::{Context, Result};
use log::info;

use crate::core::{BatchOrchestrator, BatchSummary};

/// Run a batch as described by the parsed arguments
pub fn run(args: &Args) -> Result<BatchSummary> {
    let config = args.to_config().context("Invalid batch configuration")?;

    info!(
        "Source {} -> records {} (temp {})",
        config.source_folder.display(),
        config.output_folder.display(),
        config.temp_folder.display()
    );

    let orchestrator = BatchOrchestrator::new(config)
        .context("Failed to set up batch")?
        .show_progress(!args.quiet);

    let summary = orchestrator.run().context("Batch run failed")?;
    print_summary(&summary, args.verbose);
    Ok(summary)
}
