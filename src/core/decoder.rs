// src/core/decoder.rs
//
// Decoding adapter. Compressed tracks are converted to WAV by external tools
// (mpg123, then ffmpeg); the resulting file is read with hound.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, TrackError};

/// An external command able to turn a compressed file into a WAV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderTool {
    /// `mpg123 -w <dest> <source>`
    Mpg123,
    /// `ffmpeg -i <source> <dest>`
    Ffmpeg,
    /// Arbitrary program; `{input}` and `{output}` in `args` are substituted
    Custom { program: String, args: Vec<String> },
}

impl DecoderTool {
    /// The order used when nothing else is configured
    pub fn default_chain() -> Vec<Self> {
        vec![Self::Mpg123, Self::Ffmpeg]
    }

    pub fn program(&self) -> &str {
        match self {
            DecoderTool::Mpg123 => "mpg123",
            DecoderTool::Ffmpeg => "ffmpeg",
            DecoderTool::Custom { program, .. } => program,
        }
    }

    /// Command-line arguments for converting `source` into `dest`
    pub fn args(&self, source: &Path, dest: &Path) -> Vec<OsString> {
        match self {
            DecoderTool::Mpg123 => vec![
                "-w".into(),
                dest.as_os_str().to_owned(),
                source.as_os_str().to_owned(),
            ],
            DecoderTool::Ffmpeg => vec![
                "-nostdin".into(),
                "-i".into(),
                source.as_os_str().to_owned(),
                dest.as_os_str().to_owned(),
            ],
            DecoderTool::Custom { args, .. } => args
                .iter()
                .map(|arg| match arg.as_str() {
                    "{input}" => source.as_os_str().to_owned(),
                    "{output}" => dest.as_os_str().to_owned(),
                    other => other.into(),
                })
                .collect(),
        }
    }

    /// Run the tool once. Success means it launched, exited cleanly and
    /// left `dest` behind.
    fn attempt(&self, source: &Path, dest: &Path) -> std::result::Result<(), String> {
        let output = Command::new(self.program())
            .args(self.args(source, dest))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to launch {}: {}", self.program(), e))?;

        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        if !dest.exists() {
            return Err(format!("{} produced no output file", self.program()));
        }
        Ok(())
    }
}

impl std::fmt::Display for DecoderTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Converts a compressed track into a waveform file on disk
pub trait Decode: Send + Sync {
    /// Produce `dest` from `source`, returning the path of the waveform file
    fn decode(&self, source: &Path, dest: &Path) -> Result<PathBuf>;
}

/// Decoder backed by a chain of external tools, first success wins
#[derive(Debug, Clone)]
pub struct ExternalDecoder {
    tools: Vec<DecoderTool>,
}

impl ExternalDecoder {
    pub fn new(tools: Vec<DecoderTool>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &[DecoderTool] {
        &self.tools
    }
}

impl Default for ExternalDecoder {
    fn default() -> Self {
        Self::new(DecoderTool::default_chain())
    }
}

impl Decode for ExternalDecoder {
    fn decode(&self, source: &Path, dest: &Path) -> Result<PathBuf> {
        if dest.exists() {
            debug!("Reusing decoded waveform {}", dest.display());
            return Ok(dest.to_path_buf());
        }

        for tool in &self.tools {
            match tool.attempt(source, dest) {
                Ok(()) => {
                    debug!("Decoded {} with {}", source.display(), tool);
                    return Ok(dest.to_path_buf());
                }
                Err(reason) => {
                    warn!("{}: {}", source.display(), reason);
                    // A failed tool may leave a truncated file; the next one
                    // must start clean.
                    if dest.exists() {
                        if let Err(e) = std::fs::remove_file(dest) {
                            warn!("Could not remove partial {}: {}", dest.display(), e);
                        }
                    }
                }
            }
        }

        Err(TrackError::DecodeUnavailable {
            track: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string()),
            tools: self.tools.iter().map(|t| t.to_string()).collect(),
        })
    }
}

/// Decoded, time-domain audio
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Interleaved samples in the file's native scale
    pub samples: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: usize,
}

impl Waveform {
    pub fn new(samples: Vec<f64>, sample_rate: u32, channels: usize) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Collapse to one channel by averaging each frame
    pub fn to_mono(&self) -> Vec<f64> {
        if self.channels == 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks_exact(self.channels)
            .map(|frame| frame.iter().sum::<f64>() / self.channels as f64)
            .collect()
    }
}

/// Read a WAV file into a waveform
pub fn read_waveform(path: &Path) -> Result<Waveform> {
    let wrap = |source: hound::Error| TrackError::Waveform {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = hound::WavReader::open(path).map_err(wrap)?;
    let spec = reader.spec();

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()
            .map_err(wrap)?,
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()
            .map_err(wrap)?,
    };

    debug!(
        "{}: {} Hz, {} channel(s), {} bits, {} samples",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        samples.len()
    );

    Ok(Waveform::new(samples, spec.sample_rate, spec.channels as usize))
}
