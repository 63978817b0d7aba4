//! Whole-signal FFT with zero padding

use num_complex::Complex;
use rustfft::FftPlanner;

/// Smallest power of two that holds `n` samples
pub fn padded_len(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Copy `samples` into a zero-filled buffer of `padded_len` length
pub fn zero_pad(samples: &[f64]) -> Vec<f64> {
    let mut padded = vec![0.0; padded_len(samples.len())];
    padded[..samples.len()].copy_from_slice(samples);
    padded
}

/// Full-length FFT processor over a single, already padded signal
pub struct FftProcessor {
    planner: FftPlanner<f64>,
}

impl FftProcessor {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Magnitude of every complex bin, negative frequencies included
    pub fn magnitude_spectrum(&mut self, signal: &[f64]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }

        let fft = self.planner.plan_fft_forward(signal.len());
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&s| Complex::new(s, 0.0)).collect();

        fft.process(&mut buffer);

        buffer.iter().map(|c| c.norm()).collect()
    }
}

impl Default for FftProcessor {
    fn default() -> Self {
        Self::new()
    }
}
