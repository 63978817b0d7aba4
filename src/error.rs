// src/error.rs
//
// Per-track error taxonomy. Every variant is caught at the unit boundary of a
// batch run; none of them terminates sibling tracks.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning one track into a stored spectrum
#[derive(Error, Debug)]
pub enum TrackError {
    /// Every configured external decoder failed or produced no output
    #[error("no decoder could convert {track} (tried: {})", tools.join(", "))]
    DecodeUnavailable { track: String, tools: Vec<String> },

    /// Decoded waveform file is missing or unreadable
    #[error("cannot read waveform {}: {source}", path.display())]
    Waveform {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Signal is empty or silent, normalization has no reference
    #[error("degenerate signal: {0}")]
    DegenerateSignal(String),

    /// Record could not be encoded or decoded
    #[error("record serialization failed for {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spectrum image could not be rendered or written
    #[error("plot failed: {0}")]
    Plot(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl TrackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly label used in summaries and logs
    pub fn kind(&self) -> &'static str {
        match self {
            TrackError::DecodeUnavailable { .. } => "decode_unavailable",
            TrackError::Waveform { .. } => "waveform",
            TrackError::DegenerateSignal(_) => "degenerate_signal",
            TrackError::Serialization { .. } => "serialization",
            TrackError::Io { .. } => "io",
            TrackError::Plot(_) => "plot",
            TrackError::InvalidConfig(_) => "invalid_config",
            TrackError::WorkerPool(_) => "worker_pool",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
