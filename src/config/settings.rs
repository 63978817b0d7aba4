// src/config/settings.rs
//
// Spectrum and batch settings, loadable from JSON and adjustable through a
// fluent builder.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::decoder::DecoderTool;
use crate::error::{Result, TrackError};

/// Default upper frequency limit in Hz
pub const DEFAULT_RATE_LIMIT: f64 = 6000.0;

/// Default bin width in Hz
pub const DEFAULT_MIN_FREQ: f64 = 1.0;

/// Amplitude the strongest remaining bin is scaled to
pub const REFERENCE_AMPLITUDE: f64 = 100.0;

/// Parameters of the spectral transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumSettings {
    /// Highest frequency kept (inclusive)
    pub rate_limit: f64,
    /// Lowest frequency kept (inclusive), no lower bound when unset
    pub bottom_limit: Option<f64>,
    /// Width of one aggregation bin
    pub min_freq: f64,
    /// Normalize around empty bins instead of rejecting the track. Tracks
    /// whose frequency axis is coarser than the bin width produce empty bins.
    pub keep_sparse_bins: bool,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            rate_limit: DEFAULT_RATE_LIMIT,
            bottom_limit: None,
            min_freq: DEFAULT_MIN_FREQ,
            keep_sparse_bins: false,
        }
    }
}

impl SpectrumSettings {
    pub fn with_rate_limit(rate_limit: f64) -> Self {
        Self {
            rate_limit,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.rate_limit.is_finite() && self.rate_limit > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "rate_limit must be a positive number, got {}",
                self.rate_limit
            )));
        }
        if !(self.min_freq.is_finite() && self.min_freq > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "min_freq must be a positive number, got {}",
                self.min_freq
            )));
        }
        if let Some(bottom) = self.bottom_limit {
            if !bottom.is_finite() || bottom >= self.rate_limit {
                return Err(TrackError::InvalidConfig(format!(
                    "bottom_limit {} must be below rate_limit {}",
                    bottom, self.rate_limit
                )));
            }
        }
        Ok(())
    }
}

/// Complete configuration of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Folder holding the compressed tracks
    pub source_folder: PathBuf,
    /// Folder receiving one JSON record per track
    pub output_folder: PathBuf,
    /// Folder receiving decoded WAV files
    pub temp_folder: PathBuf,
    /// Folder receiving spectrum images (required when plotting)
    pub image_folder: Option<PathBuf>,
    /// Recompute tracks whose record already exists
    pub overwrite: bool,
    /// Render a spectrum image per track
    pub plot: bool,
    /// Worker threads, half the available cores when unset
    pub workers: Option<usize>,
    /// External decoders in the order they are tried
    pub decoders: Vec<DecoderTool>,
    pub spectrum: SpectrumSettings,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::new(),
            output_folder: PathBuf::new(),
            temp_folder: PathBuf::new(),
            image_folder: None,
            overwrite: true,
            plot: false,
            workers: None,
            decoders: DecoderTool::default_chain(),
            spectrum: SpectrumSettings::default(),
        }
    }
}

impl BatchConfig {
    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TrackError::io(path, e))?;
        serde_json::from_str(&json).map_err(|source| TrackError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            TrackError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|e| TrackError::io(path, e))
    }

    /// Number of pool threads for this run
    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => default_worker_count(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, folder) in [
            ("source_folder", &self.source_folder),
            ("output_folder", &self.output_folder),
            ("temp_folder", &self.temp_folder),
        ] {
            if folder.as_os_str().is_empty() {
                return Err(TrackError::InvalidConfig(format!("{} is not set", name)));
            }
        }
        if self.plot && self.image_folder.is_none() {
            return Err(TrackError::InvalidConfig(
                "image_folder is required when plotting is enabled".to_string(),
            ));
        }
        if self.decoders.is_empty() {
            return Err(TrackError::InvalidConfig(
                "at least one decoder must be configured".to_string(),
            ));
        }
        self.spectrum.validate()
    }
}

/// Half the logical cores, never less than one
pub fn default_worker_count() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// Builder for batch configurations
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn new(
        source_folder: impl Into<PathBuf>,
        output_folder: impl Into<PathBuf>,
        temp_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: BatchConfig {
                source_folder: source_folder.into(),
                output_folder: output_folder.into(),
                temp_folder: temp_folder.into(),
                ..Default::default()
            },
        }
    }

    pub fn from_config(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn rate_limit(mut self, rate_limit: f64) -> Self {
        self.config.spectrum.rate_limit = rate_limit;
        self
    }

    pub fn bottom_limit(mut self, bottom_limit: Option<f64>) -> Self {
        self.config.spectrum.bottom_limit = bottom_limit;
        self
    }

    pub fn min_freq(mut self, min_freq: f64) -> Self {
        self.config.spectrum.min_freq = min_freq;
        self
    }

    pub fn keep_sparse_bins(mut self, keep: bool) -> Self {
        self.config.spectrum.keep_sparse_bins = keep;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Enable plotting into the given folder
    pub fn plot(mut self, image_folder: impl Into<PathBuf>) -> Self {
        self.config.plot = true;
        self.config.image_folder = Some(image_folder.into());
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    pub fn decoders(mut self, decoders: Vec<DecoderTool>) -> Self {
        self.config.decoders = decoders;
        self
    }

    pub fn build(self) -> Result<BatchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
