#![allow(dead_code)]

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use songspectra::core::Decode;
use songspectra::error::{Result, TrackError};

/// Write a 16-bit PCM WAV with the given interleaved samples
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in samples {
        writer.write_sample(s).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Mono sine tone as 16-bit samples
pub fn sine_samples(freq: f64, sample_rate: u32, secs: f64, amplitude: f64) -> Vec<i16> {
    let n = (sample_rate as f64 * secs) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * PI * freq * t).sin() * amplitude) as i16
        })
        .collect()
}

/// Write a mono sine WAV
pub fn write_sine(path: &Path, freq: f64, sample_rate: u32, secs: f64) {
    write_wav(path, sample_rate, 1, &sine_samples(freq, sample_rate, secs, 16000.0));
}

/// Decoder stand-in: the "compressed" source already is a WAV file
#[derive(Clone, Default)]
pub struct CopyDecoder {
    pub calls: Arc<AtomicUsize>,
}

impl CopyDecoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Decode for CopyDecoder {
    fn decode(&self, source: &Path, dest: &Path) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !dest.exists() {
            fs::copy(source, dest).map_err(|e| TrackError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;
        }
        Ok(dest.to_path_buf())
    }
}

/// Decoder stand-in that never produces anything
pub struct FailingDecoder;

impl Decode for FailingDecoder {
    fn decode(&self, source: &Path, _dest: &Path) -> Result<PathBuf> {
        Err(TrackError::DecodeUnavailable {
            track: source.display().to_string(),
            tools: vec!["none".to_string()],
        })
    }
}

/// Scratch layout: `<root>/songs`, `<root>/records`, `<root>/wav`
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("songs")).expect("songs dir");
        Self { dir }
    }

    pub fn songs(&self) -> PathBuf {
        self.dir.path().join("songs")
    }

    pub fn records(&self) -> PathBuf {
        self.dir.path().join("records")
    }

    pub fn wav(&self) -> PathBuf {
        self.dir.path().join("wav")
    }

    pub fn images(&self) -> PathBuf {
        self.dir.path().join("images")
    }
}
