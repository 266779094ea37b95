//! Mel filterbank and mel-frequency cepstral coefficients
//!
//! The filterbank depends on frame size, sampling frequency and band count.
//! It is built on first use and rebuilt only when one of those changes.

use crate::config;
use crate::error::Result;
use std::f32::consts::PI;

/// Added to mel band energies before the logarithm
const LOG_FLOOR: f32 = f32::MIN_POSITIVE;

/// Convert a frequency in Hz to mels
#[inline]
pub fn hz_to_mel(frequency: f32) -> f32 {
    1127.0 * (1.0 + frequency / 700.0).ln()
}

/// Convert mels back to Hz
#[inline]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * ((mel / 1127.0).exp() - 1.0)
}

/// Triangular filters evenly spaced on the mel scale from 0 Hz to Nyquist
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    frame_size: usize,
    sampling_frequency: f32,
    /// One row of weights per band, one column per spectrum bin
    weights: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Build the filterbank for a frame size, sampling frequency and band count
    pub fn new(frame_size: usize, sampling_frequency: f32, bands: usize) -> Self {
        let bins = frame_size / 2 + 1;
        let max_mel = hz_to_mel(sampling_frequency / 2.0);

        // Band edges: bands + 2 points, consecutive triples define one triangle
        let edges: Vec<usize> = (0..bands + 2)
            .map(|i| {
                let mel = i as f32 * max_mel / (bands + 1) as f32;
                let hz = mel_to_hz(mel);
                let bin = (0.5 + hz * frame_size as f32 / sampling_frequency).floor() as usize;
                bin.min(bins - 1)
            })
            .collect();

        let weights = edges
            .windows(3)
            .map(|edge| {
                let (begin, centre, end) = (edge[0], edge[1], edge[2]);
                let mut row = vec![0.0f32; bins];

                for (k, w) in row.iter_mut().enumerate().take(centre).skip(begin) {
                    *w = (k - begin) as f32 / (centre - begin) as f32;
                }
                for (k, w) in row.iter_mut().enumerate().take(end).skip(centre) {
                    *w = (end - k) as f32 / (end - centre) as f32;
                }
                row
            })
            .collect();

        Self {
            frame_size,
            sampling_frequency,
            weights,
        }
    }

    /// Whether this filterbank was built for the given parameters
    pub fn matches(&self, frame_size: usize, sampling_frequency: f32, bands: usize) -> bool {
        self.frame_size == frame_size
            && self.sampling_frequency == sampling_frequency
            && self.weights.len() == bands
    }

    pub fn bands(&self) -> usize {
        self.weights.len()
    }

    /// Number of spectrum bins each filter spans
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Weights of one band across all bins
    pub fn band(&self, index: usize) -> &[f32] {
        &self.weights[index]
    }

    /// Project a magnitude spectrum onto the mel bands
    pub fn apply(&self, spectrum: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|row| row.iter().zip(spectrum).map(|(w, m)| w * m).sum())
            .collect()
    }
}

/// Mel spectrum and MFCC computation with a lazily built filterbank
pub struct Mfcc {
    bands: usize,
    filterbank: Option<MelFilterbank>,
}

impl Mfcc {
    pub fn new(bands: usize) -> Self {
        Self {
            bands,
            filterbank: None,
        }
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Change the band count; the filterbank is rebuilt on next use
    pub fn set_bands(&mut self, bands: usize) {
        self.bands = bands;
    }

    /// Filterbank for the given frame parameters, rebuilding if they changed
    pub fn filterbank(&mut self, frame_size: usize, sampling_frequency: f32) -> &MelFilterbank {
        let bands = self.bands;
        let stale = !self
            .filterbank
            .as_ref()
            .is_some_and(|fb| fb.matches(frame_size, sampling_frequency, bands));

        if stale {
            self.filterbank = None;
        }

        self.filterbank.get_or_insert_with(|| {
            tracing::debug!(
                frame_size,
                sampling_frequency,
                bands,
                "Building mel filterbank"
            );
            MelFilterbank::new(frame_size, sampling_frequency, bands)
        })
    }

    /// Energy per mel band for a magnitude spectrum
    pub fn mel_spectrum(
        &mut self,
        spectrum: &[f32],
        frame_size: usize,
        sampling_frequency: f32,
    ) -> Vec<f32> {
        self.filterbank(frame_size, sampling_frequency).apply(spectrum)
    }

    /// The first `count` cepstral coefficients of a magnitude spectrum
    ///
    /// Coefficients start at c0 unless `skip_zeroth` is set, in which case they
    /// start at c1. Fails when more coefficients are requested than the bands
    /// can provide.
    pub fn coefficients(
        &mut self,
        spectrum: &[f32],
        frame_size: usize,
        sampling_frequency: f32,
        count: usize,
        skip_zeroth: bool,
    ) -> Result<Vec<f32>> {
        config::check_mfcc_count(count, self.bands, skip_zeroth)?;

        let log_mel: Vec<f32> = self
            .mel_spectrum(spectrum, frame_size, sampling_frequency)
            .into_iter()
            .map(|e| (e + LOG_FLOOR).ln())
            .collect();

        let first = usize::from(skip_zeroth);
        Ok((first..first + count).map(|k| dct_ii(&log_mel, k)).collect())
    }
}

/// Coefficient `k` of the unnormalized type-II DCT: 2 * sum x[n] cos(pi/N (n + 1/2) k)
fn dct_ii(signal: &[f32], k: usize) -> f32 {
    let pi_over_n = PI / signal.len() as f32;
    let sum: f32 = signal
        .iter()
        .enumerate()
        .map(|(n, &x)| x * (pi_over_n * (n as f32 + 0.5) * k as f32).cos())
        .sum();
    2.0 * sum
}
