// src/core/store.rs
//
// Per-track JSON records: `{"<track file name>": {"<frequency>": amplitude}}`.
// Records are written to a sibling temp file and renamed into place, so an
// existing record is either left alone or replaced whole.

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::spectrum::Spectrum;
use crate::error::{Result, TrackError};

/// Extension of record files
pub const RECORD_EXTENSION: &str = "json";

/// One track's persisted spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    /// Track file name, extension included
    pub track_id: String,
    pub spectrum: Spectrum,
}

impl TrackRecord {
    pub fn new(track_id: impl Into<String>, spectrum: Spectrum) -> Self {
        Self {
            track_id: track_id.into(),
            spectrum,
        }
    }
}

/// Frequency map in ascending order. Empty bins have no frequency to key
/// them by and are left out.
struct FrequencyMap<'a>(&'a Spectrum);

impl Serialize for FrequencyMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (freq, amp) in self.0.iter() {
            let Some(key) = frequency_key(freq) else {
                continue;
            };
            let amp = if amp.is_finite() { Some(amp) } else { None };
            map.serialize_entry(&key, &amp)?;
        }
        map.end()
    }
}

/// JSON number text of a finite frequency; integral values keep their `.0`
fn frequency_key(freq: f64) -> Option<String> {
    serde_json::Number::from_f64(freq).map(|n| n.to_string())
}

impl Serialize for TrackRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.track_id, &FrequencyMap(&self.spectrum))?;
        map.end()
    }
}

/// Folder of track records
#[derive(Debug, Clone)]
pub struct TrackRecordStore {
    root: PathBuf,
}

impl TrackRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record location: track name with its extension replaced
    pub fn record_path(&self, track_id: &str) -> PathBuf {
        let mut name = Path::new(track_id)
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| track_id.into());
        name.push(".");
        name.push(RECORD_EXTENSION);
        self.root.join(name)
    }

    /// Scratch file for a record being written. Named after the full track
    /// name, so tracks sharing a stem never write the same file.
    fn temp_path(&self, track_id: &str) -> PathBuf {
        self.root.join(format!(".{}.{}.tmp", track_id, RECORD_EXTENSION))
    }

    pub fn exists(&self, track_id: &str) -> bool {
        self.record_path(track_id).is_file()
    }

    /// Write the record, replacing any previous one
    pub fn save(&self, track_id: &str, spectrum: &Spectrum) -> Result<PathBuf> {
        let path = self.record_path(track_id);
        let tmp = self.temp_path(track_id);
        let record = TrackRecord::new(track_id, spectrum.clone());

        let write = || -> Result<()> {
            let file = File::create(&tmp).map_err(|e| TrackError::io(&tmp, e))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &record).map_err(|source| {
                TrackError::Serialization {
                    path: path.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(|e| TrackError::io(&tmp, e))?;
            fs::rename(&tmp, &path).map_err(|e| TrackError::io(&path, e))
        };

        if let Err(e) = write() {
            if tmp.exists() {
                let _ = fs::remove_file(&tmp);
            }
            return Err(e);
        }

        debug!(
            "Saved {} ({} bins, {} empty) to {}",
            track_id,
            spectrum.len(),
            spectrum.empty_bins(),
            path.display()
        );
        Ok(path)
    }

    /// Read a record back into a spectrum ordered by frequency
    pub fn load(&self, track_id: &str) -> Result<TrackRecord> {
        let path = self.record_path(track_id);
        let json = fs::read_to_string(&path).map_err(|e| TrackError::io(&path, e))?;
        let serialization = |source| TrackError::Serialization {
            path: path.clone(),
            source,
        };

        let mut parsed: HashMap<String, HashMap<String, Option<f64>>> =
            serde_json::from_str(&json).map_err(serialization)?;

        let (stored_id, bins) = match parsed.remove_entry(track_id) {
            Some(entry) => entry,
            None if parsed.len() == 1 => parsed.into_iter().next().unwrap_or_default(),
            None => {
                return Err(serialization(serde::de::Error::custom(format!(
                    "record does not contain track {}",
                    track_id
                ))))
            }
        };

        let mut points = Vec::with_capacity(bins.len());
        for (key, amp) in bins {
            let freq: f64 = key.parse().map_err(|_| {
                serialization(serde::de::Error::custom(format!(
                    "invalid frequency key {:?}",
                    key
                )))
            })?;
            points.push((freq, amp.unwrap_or(f64::NAN)));
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (frequencies, amplitudes) = points.into_iter().unzip();
        Ok(TrackRecord::new(
            stored_id,
            Spectrum {
                frequencies,
                amplitudes,
            },
        ))
    }
}
