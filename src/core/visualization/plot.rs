// src/core/visualization/plot.rs
//
// Spectrum plot: one column per pixel, bar height proportional to the
// strongest amplitude falling into that column.

use image::{ImageBuffer, Rgb, RgbImage};
use std::path::{Path, PathBuf};

use crate::config::REFERENCE_AMPLITUDE;
use crate::core::spectrum::Spectrum;
use crate::error::{Result, TrackError};

/// Plot configuration
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    /// Pixels kept free around the plot area
    pub margin: u32,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
    pub axis: Rgb<u8>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 400,
            margin: 20,
            background: Rgb([255, 255, 255]),
            foreground: Rgb([31, 119, 180]),
            axis: Rgb([60, 60, 60]),
        }
    }
}

/// Renders spectra into PNG files inside one folder
#[derive(Debug, Clone)]
pub struct SpectrumPlotter {
    folder: PathBuf,
    config: PlotConfig,
}

impl SpectrumPlotter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self::with_config(folder, PlotConfig::default())
    }

    pub fn with_config(folder: impl Into<PathBuf>, config: PlotConfig) -> Self {
        Self {
            folder: folder.into(),
            config,
        }
    }

    /// Image location for a track name (extension replaced by `.png`)
    pub fn image_path(&self, track_id: &str) -> PathBuf {
        let mut name = Path::new(track_id)
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| track_id.into());
        name.push(".png");
        self.folder.join(name)
    }

    pub fn plot(&self, track_id: &str, spectrum: &Spectrum) -> Result<PathBuf> {
        let path = self.image_path(track_id);
        render_spectrum(spectrum, &self.config)?
            .save(&path)
            .map_err(|e| TrackError::Plot(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// Draw a spectrum into an image buffer
pub fn render_spectrum(spectrum: &Spectrum, config: &PlotConfig) -> Result<RgbImage> {
    if config.width <= 2 * config.margin || config.height <= 2 * config.margin {
        return Err(TrackError::Plot(format!(
            "{}x{} image leaves no room inside a {} px margin",
            config.width, config.height, config.margin
        )));
    }

    let mut img: RgbImage = ImageBuffer::from_pixel(config.width, config.height, config.background);

    let plot_w = config.width - 2 * config.margin;
    let plot_h = config.height - 2 * config.margin;
    let baseline = config.height - config.margin - 1;

    let max_freq = spectrum
        .frequencies
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .fold(0.0_f64, f64::max);

    if max_freq > 0.0 {
        // Tallest amplitude per pixel column
        let mut columns = vec![0.0_f64; plot_w as usize];
        for (freq, amp) in spectrum.iter() {
            if !freq.is_finite() || !amp.is_finite() {
                continue;
            }
            let col = ((freq / max_freq) * (plot_w - 1) as f64).round() as usize;
            let col = col.min(plot_w as usize - 1);
            columns[col] = columns[col].max(amp);
        }

        for (col, &amp) in columns.iter().enumerate() {
            let level = (amp / REFERENCE_AMPLITUDE).clamp(0.0, 1.0);
            let bar = (level * plot_h as f64).round() as u32;
            let x = config.margin + col as u32;
            for dy in 0..bar {
                img.put_pixel(x, baseline - dy, config.foreground);
            }
        }
    }

    // Axes
    for x in config.margin..config.width - config.margin {
        img.put_pixel(x, baseline, config.axis);
    }
    for y in config.margin..=baseline {
        img.put_pixel(config.margin, y, config.axis);
    }

    Ok(img)
}
