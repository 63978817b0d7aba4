//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::config::{BatchConfig, BatchConfigBuilder};
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "songspectra")]
#[command(about = "Convert a folder of audio tracks into normalized frequency spectra")]
pub struct Args {
    /// Folder with the compressed tracks
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Folder receiving one JSON record per track
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Folder receiving decoded WAV files
    #[arg(short, long)]
    pub temp: Option<PathBuf>,

    /// Highest frequency kept, in Hz
    #[arg(short, long)]
    pub rate_limit: Option<f64>,

    /// Lowest frequency kept, in Hz
    #[arg(long)]
    pub bottom_limit: Option<f64>,

    /// Width of one frequency bin, in Hz
    #[arg(long)]
    pub min_freq: Option<f64>,

    /// Keep tracks whose spectrum has empty bins instead of failing them
    #[arg(long)]
    pub keep_sparse_bins: bool,

    /// Keep existing records instead of recomputing them
    #[arg(long)]
    pub no_overwrite: bool,

    /// Render a spectrum image per track
    #[arg(short, long)]
    pub plot: bool,

    /// Folder receiving spectrum images
    #[arg(short, long)]
    pub images: Option<PathBuf>,

    /// Worker threads (default: half the CPU cores)
    #[arg(short, long, env = "SONGSPECTRA_WORKERS")]
    pub workers: Option<usize>,

    /// JSON configuration file; command-line flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Merge the optional config file with command-line flags
    pub fn to_config(&self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::load(path)?,
            None => BatchConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source_folder = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_folder = output.clone();
        }
        if let Some(temp) = &self.temp {
            config.temp_folder = temp.clone();
        }
        if let Some(images) = &self.images {
            config.image_folder = Some(images.clone());
        }
        config.plot |= self.plot;

        let mut builder = BatchConfigBuilder::from_config(config);
        if let Some(rate_limit) = self.rate_limit {
            builder = builder.rate_limit(rate_limit);
        }
        if let Some(min_freq) = self.min_freq {
            builder = builder.min_freq(min_freq);
        }
        if self.bottom_limit.is_some() {
            builder = builder.bottom_limit(self.bottom_limit);
        }
        if self.keep_sparse_bins {
            builder = builder.keep_sparse_bins(true);
        }
        if self.no_overwrite {
            builder = builder.overwrite(false);
        }
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }

        builder.build()
    }
}
