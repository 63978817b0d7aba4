//! Configuration module for songspectra

mod settings;

pub use settings::{
    default_worker_count, BatchConfig, BatchConfigBuilder, SpectrumSettings, DEFAULT_MIN_FREQ,
    DEFAULT_RATE_LIMIT, REFERENCE_AMPLITUDE,
};
