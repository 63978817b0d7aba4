//! Visualization tools
//!
//! Renders normalized spectra to images for inspection. Stored records do
//! not depend on anything here.

mod plot;

pub use plot::{render_spectrum, PlotConfig, SpectrumPlotter};
