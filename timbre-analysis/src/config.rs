//! Analyzer configuration
//!
//! Frame size and sampling frequency determine every derived cache (window
//! coefficients, FFT plan, spectrum length, mel filterbank). The remaining
//! fields tune individual features.

use crate::error::{ConfigError, Result};
use crate::window::WindowType;

/// Default number of samples per frame
pub const DEFAULT_FRAME_SIZE: usize = 512;
/// Default sampling frequency in Hz
pub const DEFAULT_SAMPLING_FREQUENCY: f32 = 44100.0;
/// Default fraction of spectral magnitude below the rolloff frequency
pub const DEFAULT_ROLLOFF_THRESHOLD: f32 = 0.85;
/// Default YIN absolute threshold
pub const DEFAULT_YIN_THRESHOLD: f32 = 0.1;
/// Default number of triangular mel filters
pub const DEFAULT_MEL_BANDS: usize = 26;
/// Default number of cepstral coefficients returned
pub const DEFAULT_MFCC_COUNT: usize = 13;

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Samples per frame
    pub frame_size: usize,
    /// Sampling frequency of the input audio in Hz
    pub sampling_frequency: f32,
    /// Window applied before the FFT
    pub window: WindowType,
    /// Fraction of total magnitude that defines the spectral rolloff point
    pub rolloff_threshold: f32,
    /// YIN absolute threshold on the normalized difference function
    pub yin_threshold: f32,
    /// Highest pitch YIN will report, in Hz; `None` searches every lag from 1
    pub yin_max_frequency: Option<f32>,
    /// Number of mel filterbank bands
    pub mel_bands: usize,
    /// Number of MFCCs returned by default
    pub mfcc_count: usize,
    /// Drop the 0th (log-energy) cepstral coefficient from MFCC output
    pub skip_zeroth_mfcc: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            sampling_frequency: DEFAULT_SAMPLING_FREQUENCY,
            window: WindowType::default(),
            rolloff_threshold: DEFAULT_ROLLOFF_THRESHOLD,
            yin_threshold: DEFAULT_YIN_THRESHOLD,
            yin_max_frequency: None,
            mel_bands: DEFAULT_MEL_BANDS,
            mfcc_count: DEFAULT_MFCC_COUNT,
            skip_zeroth_mfcc: false,
        }
    }
}

impl AnalyzerConfig {
    /// Default configuration for the given frame size and sampling frequency
    pub fn new(frame_size: usize, sampling_frequency: f32) -> Self {
        Self {
            frame_size,
            sampling_frequency,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    pub fn with_rolloff_threshold(mut self, threshold: f32) -> Self {
        self.rolloff_threshold = threshold;
        self
    }

    pub fn with_yin_threshold(mut self, threshold: f32) -> Self {
        self.yin_threshold = threshold;
        self
    }

    pub fn with_yin_max_frequency(mut self, max_frequency: Option<f32>) -> Self {
        self.yin_max_frequency = max_frequency;
        self
    }

    pub fn with_mel_bands(mut self, bands: usize) -> Self {
        self.mel_bands = bands;
        self
    }

    pub fn with_mfcc_count(mut self, count: usize) -> Self {
        self.mfcc_count = count;
        self
    }

    pub fn with_skip_zeroth_mfcc(mut self, skip: bool) -> Self {
        self.skip_zeroth_mfcc = skip;
        self
    }

    /// Number of spectrum bins produced for this frame size
    pub fn spectrum_len(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Maximum number of MFCCs that can be requested
    pub fn available_mfccs(&self) -> usize {
        available_mfccs(self.mel_bands, self.skip_zeroth_mfcc)
    }

    /// Check every field against its contract
    pub fn validate(&self) -> Result<()> {
        check_frame_size(self.frame_size)?;
        check_sampling_frequency(self.sampling_frequency)?;
        check_rolloff_threshold(self.rolloff_threshold)?;
        check_yin_threshold(self.yin_threshold)?;
        check_yin_max_frequency(self.yin_max_frequency)?;
        check_mel_bands(self.mel_bands)?;
        check_mfcc_count(self.mfcc_count, self.mel_bands, self.skip_zeroth_mfcc)
    }
}

pub(crate) fn available_mfccs(mel_bands: usize, skip_zeroth: bool) -> usize {
    if skip_zeroth {
        mel_bands.saturating_sub(1)
    } else {
        mel_bands
    }
}

pub(crate) fn check_frame_size(frame_size: usize) -> Result<()> {
    if frame_size == 0 {
        return Err(ConfigError::FrameSize(frame_size));
    }
    Ok(())
}

pub(crate) fn check_sampling_frequency(fs: f32) -> Result<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(ConfigError::SamplingFrequency(fs));
    }
    Ok(())
}

pub(crate) fn check_rolloff_threshold(threshold: f32) -> Result<()> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::RolloffThreshold(threshold));
    }
    Ok(())
}

pub(crate) fn check_yin_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ConfigError::YinThreshold(threshold));
    }
    Ok(())
}

pub(crate) fn check_yin_max_frequency(max_frequency: Option<f32>) -> Result<()> {
    match max_frequency {
        Some(f) if !f.is_finite() || f <= 0.0 => Err(ConfigError::YinMaxFrequency(f)),
        _ => Ok(()),
    }
}

pub(crate) fn check_mel_bands(bands: usize) -> Result<()> {
    if bands == 0 {
        return Err(ConfigError::MelBands(bands));
    }
    Ok(())
}

pub(crate) fn check_mfcc_count(count: usize, mel_bands: usize, skip_zeroth: bool) -> Result<()> {
    let available = available_mfccs(mel_bands, skip_zeroth);
    if count > available {
        return Err(ConfigError::TooManyCoefficients {
            requested: count,
            available,
        });
    }
    Ok(())
}
