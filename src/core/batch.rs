// src/core/batch.rs
//
// Batch orchestration. Every entry of the source folder is one independent
// unit: skip guard, decode, transform, store, optional plot. Units run on a
// fixed-size rayon pool and never share mutable state; a failing unit is
// logged and recorded without touching its siblings.

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::decoder::{read_waveform, Decode, ExternalDecoder};
use super::spectrum::SpectralTransformer;
use super::store::TrackRecordStore;
use super::visualization::SpectrumPlotter;
use crate::config::BatchConfig;
use crate::error::{Result, TrackError};

/// Extension of decoded waveform files in the temp folder
pub const WAVEFORM_EXTENSION: &str = "wav";

/// What happened to one track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// Record written (and image, when plotting)
    Processed {
        record: PathBuf,
        image: Option<PathBuf>,
    },
    /// Record already present and overwrite disabled
    Skipped,
}

/// Per-track result of a batch run
#[derive(Debug)]
pub struct TrackReport {
    pub track_id: String,
    pub result: Result<TrackOutcome>,
}

/// Aggregate of all units of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, TrackError)>,
}

impl BatchSummary {
    pub fn from_reports(reports: Vec<TrackReport>) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.result {
                Ok(TrackOutcome::Processed { .. }) => summary.processed.push(report.track_id),
                Ok(TrackOutcome::Skipped) => summary.skipped.push(report.track_id),
                Err(e) => summary.failed.push((report.track_id, e)),
            }
        }
        summary.processed.sort();
        summary.skipped.sort();
        summary.failed.sort_by(|a, b| a.0.cmp(&b.0));
        summary
    }

    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }

    /// True when no unit failed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives the per-track pipeline over a source folder
pub struct BatchOrchestrator {
    config: BatchConfig,
    decoder: Box<dyn Decode>,
    transformer: SpectralTransformer,
    store: TrackRecordStore,
    plotter: Option<SpectrumPlotter>,
    show_progress: bool,
}

impl BatchOrchestrator {
    /// Orchestrator using the configured external decoders
    pub fn new(config: BatchConfig) -> Result<Self> {
        let decoder = ExternalDecoder::new(config.decoders.clone());
        Self::with_decoder(config, Box::new(decoder))
    }

    /// Orchestrator with a caller-supplied decode step
    pub fn with_decoder(config: BatchConfig, decoder: Box<dyn Decode>) -> Result<Self> {
        config.validate()?;

        let plotter = if config.plot {
            config.image_folder.as_ref().map(SpectrumPlotter::new)
        } else {
            None
        };

        Ok(Self {
            transformer: SpectralTransformer::new(config.spectrum.clone()),
            store: TrackRecordStore::new(&config.output_folder),
            plotter,
            decoder,
            config,
            show_progress: false,
        })
    }

    /// Draw a progress bar while the batch runs
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn store(&self) -> &TrackRecordStore {
        &self.store
    }

    /// Process every track of the source folder
    pub fn run(&self) -> Result<BatchSummary> {
        self.prepare_folders()?;
        let tracks = list_tracks(&self.config.source_folder)?;

        if tracks.is_empty() {
            info!("No tracks found in {}", self.config.source_folder.display());
            return Ok(BatchSummary::default());
        }

        let workers = self.config.worker_count();
        info!("Processing {} track(s) on {} worker(s)", tracks.len(), workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("songspectra-{}", i))
            .build()?;

        let progress = if self.show_progress {
            let pb = ProgressBar::new(tracks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let reports: Vec<TrackReport> = pool.install(|| {
            tracks
                .par_iter()
                .progress_with(progress.clone())
                .map(|track_id| {
                    let result = self.process_track(track_id);
                    if let Err(e) = &result {
                        error!("{}: {} [{}]", track_id, e, e.kind());
                    }
                    TrackReport {
                        track_id: track_id.clone(),
                        result,
                    }
                })
                .collect()
        });
        progress.finish_and_clear();

        let summary = BatchSummary::from_reports(reports);
        info!(
            "Batch finished: {} processed, {} skipped, {} failed",
            summary.processed.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Run one track through skip guard, decode, transform, store and plot
    pub fn process_track(&self, track_id: &str) -> Result<TrackOutcome> {
        if !self.config.overwrite && self.store.exists(track_id) {
            debug!("{}: record exists, skipping", track_id);
            return Ok(TrackOutcome::Skipped);
        }

        let source = self.config.source_folder.join(track_id);
        let waveform_path = self.waveform_path(track_id);

        let decoded = self.decoder.decode(&source, &waveform_path)?;
        let waveform = read_waveform(&decoded)?;
        let spectrum = self.transformer.transform(&waveform)?;
        let record = self.store.save(track_id, &spectrum)?;

        let image = match &self.plotter {
            Some(plotter) => Some(plotter.plot(track_id, &spectrum)?),
            None => None,
        };

        debug!(
            "{}: {:.1}s of audio, peak at {:.1} Hz",
            track_id,
            waveform.duration_secs(),
            spectrum.peak_frequency().unwrap_or(f64::NAN)
        );
        Ok(TrackOutcome::Processed { record, image })
    }

    /// Decoded waveform location for a track
    pub fn waveform_path(&self, track_id: &str) -> PathBuf {
        let mut name = Path::new(track_id)
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| track_id.into());
        name.push(".");
        name.push(WAVEFORM_EXTENSION);
        self.config.temp_folder.join(name)
    }

    fn prepare_folders(&self) -> Result<()> {
        let mut folders = vec![&self.config.temp_folder, &self.config.output_folder];
        if self.config.plot {
            if let Some(images) = &self.config.image_folder {
                folders.push(images);
            }
        }
        for folder in folders {
            fs::create_dir_all(folder).map_err(|e| TrackError::io(folder, e))?;
        }
        Ok(())
    }
}

/// Names of all non-directory entries directly inside `folder`, sorted
pub fn list_tracks(folder: &Path) -> Result<Vec<String>> {
    let mut tracks = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| TrackError::io(folder, e.into()))?;
        if entry.file_type().is_dir() {
            debug!("Ignoring directory {}", entry.path().display());
            continue;
        }
        tracks.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(tracks)
}

/// Run a batch with the external decoders named in `config`
pub fn run(config: BatchConfig) -> Result<BatchSummary> {
    BatchOrchestrator::new(config)?.run()
}
