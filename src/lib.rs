//! songspectra - normalized frequency fingerprints for audio collections
//!
//! Converts a folder of compressed tracks into one JSON record per track,
//! holding the track's amplitude spectrum quantized onto a fixed frequency
//! grid. Records are meant for downstream comparison and clustering of songs
//! by spectral content.
//!
//! ## Pipeline
//!
//! For every track, independently and in this order:
//!
//! 1. **Skip guard**: with overwrite disabled, an existing record ends the unit
//! 2. **Decode**: `mpg123`, then `ffmpeg`, converts the track to WAV
//! 3. **Transform**: mono mix, zero padding to a power of two, FFT magnitude,
//!    frequency limiting, 1 Hz bin aggregation, normalization to 100.0
//! 4. **Store**: `{"<track>": {"<frequency>": amplitude}}`, atomically replaced
//! 5. **Plot** (optional): PNG rendering of the spectrum
//!
//! Tracks run on a rayon pool of half the CPU cores. A failing track is logged
//! and reported in the [`BatchSummary`]; the others carry on.
//!
//! ## Module Structure
//!
//! - `core` - decoding, DSP, spectrum, record store, batch orchestration
//! - `cli` - command-line interface
//! - `config` - spectrum and batch settings
//! - `error` - per-track error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songspectra::config::BatchConfigBuilder;
//! use songspectra::core::BatchOrchestrator;
//!
//! let config = BatchConfigBuilder::new("songs", "fourier", "wav")
//!     .rate_limit(6000.0)
//!     .overwrite(false)
//!     .build()?;
//!
//! let summary = BatchOrchestrator::new(config)?.run()?;
//! println!("{} processed, {} failed", summary.processed.len(), summary.failed.len());
//! ```

// Core pipeline
pub mod core;

// Command-line interface
pub mod cli;

// Settings and builders
pub mod config;

// Error taxonomy
pub mod error;

pub use crate::config::{BatchConfig, BatchConfigBuilder, SpectrumSettings};
pub use crate::core::{
    BatchOrchestrator, BatchSummary, Decode, DecoderTool, ExternalDecoder, SpectralTransformer,
    Spectrum, SpectrumPlotter, TrackOutcome, TrackRecord, TrackRecordStore, Waveform,
};
pub use crate::error::TrackError;
