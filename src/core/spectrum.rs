// src/core/spectrum.rs
//
// Spectral transform: mono collapse, zero padding, FFT magnitude, frequency
// limiting, unit-bin aggregation and amplitude normalization.

use log::debug;

use super::decoder::Waveform;
use super::dsp::{argmax, linspace, mean, zero_pad, FftProcessor};
use crate::config::{SpectrumSettings, REFERENCE_AMPLITUDE};
use crate::error::{Result, TrackError};

/// Frequency/amplitude pairs in ascending frequency order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

impl Spectrum {
    /// Pair up two equally long arrays; the longer one is truncated
    pub fn new(mut frequencies: Vec<f64>, mut amplitudes: Vec<f64>) -> Self {
        let len = frequencies.len().min(amplitudes.len());
        frequencies.truncate(len);
        amplitudes.truncate(len);
        Self {
            frequencies,
            amplitudes,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }

    /// Largest amplitude, NaN bins ignored
    pub fn max_amplitude(&self) -> Option<f64> {
        argmax(&self.amplitudes).map(|i| self.amplitudes[i])
    }

    /// Frequency of the strongest bin
    pub fn peak_frequency(&self) -> Option<f64> {
        argmax(&self.amplitudes).map(|i| self.frequencies[i])
    }

    /// Number of bins with no source points
    pub fn empty_bins(&self) -> usize {
        self.amplitudes.iter().filter(|a| a.is_nan()).count()
    }

    /// Keep points with `bottom <= f <= upper`
    pub fn limit(&self, upper: f64, bottom: Option<f64>) -> Spectrum {
        let (frequencies, amplitudes) = self
            .iter()
            .filter(|&(f, _)| f <= upper && bottom.map_or(true, |b| f >= b))
            .unzip();
        Spectrum {
            frequencies,
            amplitudes,
        }
    }

    /// Re-quantize into bins of width `min_freq`.
    ///
    /// The number of bins is `floor(max_rate / min_freq)`, where `max_rate`
    /// defaults to the highest frequency present. Bin `i` starts at `i` Hz and
    /// covers `[i, i + min_freq)`, so wider bins overlap their neighbours. Each
    /// output point is the mean frequency and mean amplitude of the source
    /// points inside; a bin without points is NaN.
    pub fn group(&self, max_rate: Option<f64>, min_freq: f64) -> Spectrum {
        if !(min_freq.is_finite() && min_freq > 0.0) {
            return Spectrum::default();
        }
        let max_rate = match max_rate.or_else(|| {
            self.frequencies
                .iter()
                .copied()
                .filter(|f| !f.is_nan())
                .reduce(f64::max)
        }) {
            Some(m) if m > 0.0 && m.is_finite() => m,
            _ => return Spectrum::default(),
        };

        let mut points: Vec<(f64, f64)> = self.iter().filter(|(f, _)| !f.is_nan()).collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (freqs, amps): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

        let bins = (max_rate / min_freq) as usize;
        let mut frequencies = Vec::with_capacity(bins);
        let mut amplitudes = Vec::with_capacity(bins);
        for i in 0..bins {
            let start = i as f64;
            let lo = freqs.partition_point(|&f| f < start);
            let hi = freqs.partition_point(|&f| f < start + min_freq).max(lo);
            frequencies.push(mean(&freqs[lo..hi]));
            amplitudes.push(mean(&amps[lo..hi]));
        }

        Spectrum {
            frequencies,
            amplitudes,
        }
    }

    /// Zero the dominant bin, then scale so the remaining maximum equals
    /// [`REFERENCE_AMPLITUDE`].
    ///
    /// An empty bin outranks every amplitude, so it is the one zeroed when
    /// present. Any empty bin left after that would turn the reference
    /// maximum into NaN and is a [`TrackError::DegenerateSignal`].
    pub fn normalize(mut self) -> Result<Spectrum> {
        let peak = self
            .amplitudes
            .iter()
            .position(|a| a.is_nan())
            .or_else(|| argmax(&self.amplitudes))
            .ok_or_else(|| TrackError::DegenerateSignal("spectrum has no amplitudes".into()))?;
        self.amplitudes[peak] = 0.0;

        let empty = self.empty_bins();
        if empty > 0 {
            return Err(TrackError::DegenerateSignal(format!(
                "{} of {} bins have no source frequencies",
                empty + 1,
                self.len()
            )));
        }
        self.rescale()
    }

    /// Like [`Spectrum::normalize`], but empty bins are left as NaN and take
    /// no part in choosing the dominant bin or the reference maximum.
    pub fn normalize_sparse(mut self) -> Result<Spectrum> {
        let peak = argmax(&self.amplitudes)
            .ok_or_else(|| TrackError::DegenerateSignal("spectrum has no amplitudes".into()))?;
        self.amplitudes[peak] = 0.0;
        self.rescale()
    }

    fn rescale(mut self) -> Result<Spectrum> {
        let max = self.max_amplitude().unwrap_or(0.0);
        let scale = max / REFERENCE_AMPLITUDE;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TrackError::DegenerateSignal(format!(
                "no reference amplitude after removing the dominant bin (max {})",
                max
            )));
        }

        for a in self.amplitudes.iter_mut() {
            *a = if *a == max { REFERENCE_AMPLITUDE } else { *a / scale };
        }
        Ok(self)
    }
}

/// Turns waveforms into normalized spectra
#[derive(Debug, Clone, Default)]
pub struct SpectralTransformer {
    settings: SpectrumSettings,
}

impl SpectralTransformer {
    pub fn new(settings: SpectrumSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SpectrumSettings {
        &self.settings
    }

    pub fn transform(&self, waveform: &Waveform) -> Result<Spectrum> {
        self.settings.validate()?;
        let mono = waveform.to_mono();
        if mono.is_empty() {
            return Err(TrackError::DegenerateSignal("waveform has no samples".into()));
        }
        if waveform.sample_rate == 0 {
            return Err(TrackError::DegenerateSignal("sample rate is zero".into()));
        }

        let padded = zero_pad(&mono);
        let magnitudes = FftProcessor::new().magnitude_spectrum(&padded);
        let axis = linspace(0.0, waveform.sample_rate as f64, magnitudes.len());

        debug!(
            "FFT over {} samples (padded from {}), {} Hz",
            padded.len(),
            mono.len(),
            waveform.sample_rate
        );

        let binned = Spectrum::new(axis, magnitudes)
            .limit(self.settings.rate_limit, self.settings.bottom_limit)
            .group(None, self.settings.min_freq);

        if binned.is_empty() {
            return Err(TrackError::DegenerateSignal(format!(
                "no frequencies left below {} Hz",
                self.settings.rate_limit
            )));
        }

        if self.settings.keep_sparse_bins {
            binned.normalize_sparse()
        } else {
            binned.normalize()
        }
    }
}

/// Transform with default settings and the given upper limit
pub fn transform(waveform: &Waveform, rate_limit: f64) -> Result<Spectrum> {
    SpectralTransformer::new(SpectrumSettings::with_rate_limit(rate_limit)).transform(waveform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, rate: u32, secs: f64) -> Vec<f64> {
        let n = (rate as f64 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_limit_is_inclusive_at_upper_bound() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]);
        let limited = s.limit(2.0, None);
        assert_eq!(limited.frequencies, vec![0.0, 1.0, 2.0]);
        assert_eq!(limited.amplitudes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_limit_bottom_bound() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]);
        let limited = s.limit(3.0, Some(1.0));
        assert_eq!(limited.frequencies, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_group_averages_each_bin() {
        let s = Spectrum::new(
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
            vec![2.0, 4.0, 6.0, 8.0, 1.0, 3.0, 9.0],
        );
        let g = s.group(None, 1.0);

        // floor(3.0 / 1.0) bins; the point at 3.0 has no bin
        assert_eq!(g.len(), 3);
        assert_eq!(g.frequencies, vec![0.25, 1.25, 2.25]);
        assert_eq!(g.amplitudes, vec![3.0, 7.0, 2.0]);
    }

    #[test]
    fn test_group_wider_bins_start_at_each_hertz() {
        let s = Spectrum::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        );
        let g = s.group(None, 2.0);

        // floor(5 / 2) bins: [0, 2) and [1, 3)
        assert_eq!(g.frequencies, vec![0.5, 1.5]);
        assert_eq!(g.amplitudes, vec![1.5, 2.5]);
    }

    #[test]
    fn test_group_narrow_bins_leave_gaps() {
        let s = Spectrum::new(vec![0.0, 0.25, 1.0, 1.75, 2.0], vec![4.0, 2.0, 6.0, 8.0, 1.0]);
        let g = s.group(None, 0.5);

        // floor(2 / 0.5) bins: [0, 0.5), [1, 1.5), [2, 2.5), [3, 3.5)
        assert_eq!(g.len(), 4);
        assert_eq!(g.frequencies[..3], [0.125, 1.0, 2.0]);
        assert_eq!(g.amplitudes[..3], [3.0, 6.0, 1.0]);
        assert!(g.amplitudes[3].is_nan());
    }

    #[test]
    fn test_group_rejects_non_positive_width() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]);
        assert!(s.group(None, 0.0).is_empty());
        assert!(s.group(None, -1.0).is_empty());
        assert!(s.group(None, f64::NAN).is_empty());
    }

    #[test]
    fn test_group_leaves_empty_bins_nan() {
        let s = Spectrum::new(vec![0.0, 2.5, 4.0], vec![1.0, 2.0, 3.0]);
        let g = s.group(None, 1.0);
        assert_eq!(g.len(), 4);
        assert!(g.amplitudes[1].is_nan());
        assert!(g.frequencies[1].is_nan());
        assert_eq!(g.amplitudes[2], 2.0);
        assert_eq!(g.empty_bins(), 2);
    }

    #[test]
    fn test_regrouping_is_stable() {
        let freqs: Vec<f64> = (0..400).map(|i| i as f64 * 0.25).collect();
        let amps: Vec<f64> = freqs.iter().map(|f| (f * 0.3).sin().abs()).collect();
        let once = Spectrum::new(freqs, amps).group(None, 1.0);
        let twice = once.group(None, 1.0);

        assert!(twice.len() + 1 >= once.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!((a.0 - b.0).abs() < 1e-12);
            assert!((a.1 - b.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_zeroes_peak_and_scales_to_reference() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0], vec![10.0, 50.0, 25.0, 5.0]);
        let n = s.normalize().unwrap();
        assert_eq!(n.amplitudes[1], 0.0);
        assert_eq!(n.amplitudes[2], 100.0);
        assert!((n.amplitudes[0] - 40.0).abs() < 1e-12);
        assert!((n.amplitudes[3] - 20.0).abs() < 1e-12);
        assert_eq!(n.max_amplitude(), Some(100.0));
    }

    #[test]
    fn test_normalize_zeroes_single_empty_bin() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0], vec![f64::NAN, 8.0, 4.0]);
        let n = s.normalize().unwrap();
        assert_eq!(n.amplitudes[0], 0.0);
        assert_eq!(n.amplitudes[1], 100.0);
        assert!((n.amplitudes[2] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_with_several_empty_bins_is_degenerate() {
        let s = Spectrum::new(
            vec![0.0, f64::NAN, 2.0, f64::NAN],
            vec![3.0, f64::NAN, 9.0, f64::NAN],
        );
        assert!(matches!(s.normalize(), Err(TrackError::DegenerateSignal(_))));
    }

    #[test]
    fn test_normalize_sparse_ignores_empty_bins() {
        let s = Spectrum::new(
            vec![0.0, f64::NAN, 2.0, f64::NAN, 4.0],
            vec![2.0, f64::NAN, 8.0, f64::NAN, 4.0],
        );
        let n = s.normalize_sparse().unwrap();
        assert!((n.amplitudes[0] - 50.0).abs() < 1e-12);
        assert_eq!(n.amplitudes[2], 0.0);
        assert_eq!(n.amplitudes[4], 100.0);
        assert_eq!(n.empty_bins(), 2);
    }

    #[test]
    fn test_normalize_single_spike_is_degenerate() {
        let s = Spectrum::new(vec![0.0, 1.0, 2.0], vec![0.0, 9.0, 0.0]);
        assert!(matches!(s.normalize(), Err(TrackError::DegenerateSignal(_))));
    }

    #[test]
    fn test_silence_is_degenerate() {
        let wave = Waveform::mono(vec![0.0; 4096], 8000);
        let err = transform(&wave, 4000.0).unwrap_err();
        assert!(matches!(err, TrackError::DegenerateSignal(_)));
    }

    #[test]
    fn test_empty_waveform_is_degenerate() {
        let wave = Waveform::mono(Vec::new(), 8000);
        assert!(matches!(
            transform(&wave, 4000.0),
            Err(TrackError::DegenerateSignal(_))
        ));
    }

    #[test]
    fn test_sine_peak_cluster() {
        let wave = Waveform::mono(sine(440.0, 8000, 1.0), 8000);
        let spectrum = transform(&wave, 4000.0).unwrap();

        assert_eq!(spectrum.max_amplitude(), Some(100.0));
        assert!(spectrum.frequencies.iter().all(|&f| f.is_nan() || f <= 4000.0));

        let top = spectrum.peak_frequency().unwrap();
        assert!((top - 440.0).abs() <= 2.0, "peak at {top}");

        // The pre-normalization maximum sits next to the new peak and is 0.0
        let zeroed = spectrum
            .iter()
            .filter(|&(f, a)| a == 0.0 && (f - 440.0).abs() <= 2.0)
            .count();
        assert_eq!(zeroed, 1);

        for (f, a) in spectrum.iter() {
            if a > 20.0 {
                assert!((f - 440.0).abs() <= 5.0, "strong bin at {f} Hz ({a})");
            }
        }
    }

    #[test]
    fn test_stereo_input_matches_its_mono_mix() {
        let left = sine(300.0, 8000, 1.0);
        let right: Vec<f64> = left.iter().map(|s| s * 0.5).collect();
        let interleaved: Vec<f64> = left
            .iter()
            .zip(right.iter())
            .flat_map(|(&l, &r)| [l, r])
            .collect();
        let mono: Vec<f64> = left.iter().zip(right.iter()).map(|(l, r)| (l + r) / 2.0).collect();

        let stereo = transform(&Waveform::new(interleaved, 8000, 2), 2000.0).unwrap();
        let mixed = transform(&Waveform::mono(mono, 8000), 2000.0).unwrap();

        assert_eq!(stereo.empty_bins(), 0);
        assert_eq!(stereo.len(), mixed.len());
        for (a, b) in stereo.amplitudes.iter().zip(mixed.amplitudes.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_short_track_with_coarse_axis_is_degenerate() {
        // 4096-point axis at 8000 Hz is about 1.95 Hz per point
        let wave = Waveform::mono(sine(440.0, 8000, 0.5), 8000);
        let err = transform(&wave, 4000.0).unwrap_err();
        assert!(matches!(err, TrackError::DegenerateSignal(_)));
    }

    #[test]
    fn test_short_track_kept_when_sparse_bins_allowed() {
        let wave = Waveform::mono(sine(440.0, 8000, 0.5), 8000);
        let settings = SpectrumSettings {
            rate_limit: 4000.0,
            keep_sparse_bins: true,
            ..Default::default()
        };
        let spectrum = SpectralTransformer::new(settings).transform(&wave).unwrap();
        assert!(spectrum.empty_bins() > 0);
        assert_eq!(spectrum.max_amplitude(), Some(100.0));
    }

    #[test]
    fn test_zero_bin_width_is_invalid_config() {
        let settings = SpectrumSettings {
            min_freq: 0.0,
            ..Default::default()
        };
        let wave = Waveform::mono(sine(440.0, 8000, 1.0), 8000);
        let err = SpectralTransformer::new(settings).transform(&wave).unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig(_)));
    }
}
