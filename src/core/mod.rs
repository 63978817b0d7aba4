//! Core pipeline: decoding, spectral transform, record storage and batch
//! orchestration

pub mod batch;
pub mod decoder;
pub mod dsp;
pub mod spectrum;
pub mod store;
pub mod visualization;

pub use batch::{BatchOrchestrator, BatchSummary, TrackOutcome, TrackReport};
pub use decoder::{read_waveform, Decode, DecoderTool, ExternalDecoder, Waveform};
pub use spectrum::{SpectralTransformer, Spectrum};
pub use store::{TrackRecord, TrackRecordStore};
pub use visualization::SpectrumPlotter;
