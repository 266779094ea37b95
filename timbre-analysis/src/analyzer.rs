//! Frame analyzer - the single entry point hosts drive once per audio buffer
//!
//! `process_frame` is the only call that advances state: it stores the frame,
//! recomputes the cached spectrum and evaluates the onset functions. Every
//! feature getter reads those caches, so getters called between two frames
//! always agree with each other.

use crate::config::{self, AnalyzerConfig};
use crate::error::Result;
use crate::frequency_domain;
use crate::mfcc::Mfcc;
use crate::onset::{OnsetDetector, OnsetValues};
use crate::pitch::Yin;
use crate::spectrum::SpectralTransform;
use crate::time_domain;
use crate::window::WindowType;

/// Every scalar feature of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureSet {
    pub rms: f32,
    pub peak_energy: f32,
    pub zero_crossing_rate: f32,
    pub spectral_centroid: f32,
    pub spectral_crest: f32,
    pub spectral_flatness: f32,
    pub spectral_rolloff: f32,
    pub spectral_kurtosis: f32,
    pub onset: OnsetValues,
    pub pitch: f32,
}

/// Real-time feature extractor over fixed-size mono frames
///
/// Before the first frame every cache holds silence, so getters return the
/// values of an all-zero frame.
pub struct FrameAnalyzer {
    config: AnalyzerConfig,
    /// Copy of the most recent frame
    frame: Vec<f32>,
    transform: SpectralTransform,
    onset: OnsetDetector,
    onset_values: OnsetValues,
    yin: Yin,
    mfcc: Mfcc,
    frames_processed: u64,
}

impl FrameAnalyzer {
    /// Create an analyzer from a validated configuration
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            frame: vec![0.0; config.frame_size],
            transform: SpectralTransform::new(config.frame_size, config.window),
            onset: OnsetDetector::new(config.spectrum_len()),
            onset_values: OnsetValues::default(),
            yin: Yin::new(config.yin_threshold).with_max_frequency(config.yin_max_frequency),
            mfcc: Mfcc::new(config.mel_bands),
            frames_processed: 0,
            config,
        })
    }

    /// Create an analyzer with default feature settings
    pub fn with_frame_size(frame_size: usize, sampling_frequency: f32) -> Result<Self> {
        Self::new(AnalyzerConfig::new(frame_size, sampling_frequency))
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    pub fn sampling_frequency(&self) -> f32 {
        self.config.sampling_frequency
    }

    pub fn window(&self) -> WindowType {
        self.config.window
    }

    pub fn rolloff_threshold(&self) -> f32 {
        self.config.rolloff_threshold
    }

    pub fn yin_threshold(&self) -> f32 {
        self.config.yin_threshold
    }

    pub fn yin_max_frequency(&self) -> Option<f32> {
        self.config.yin_max_frequency
    }

    pub fn mel_bands(&self) -> usize {
        self.config.mel_bands
    }

    pub fn mfcc_count(&self) -> usize {
        self.config.mfcc_count
    }

    pub fn skip_zeroth_mfcc(&self) -> bool {
        self.config.skip_zeroth_mfcc
    }

    /// Change the frame size
    ///
    /// Resizes the frame and spectrum caches to silence and clears onset
    /// history; the mel filterbank follows on its next use.
    pub fn set_frame_size(&mut self, frame_size: usize) -> Result<()> {
        config::check_frame_size(frame_size)?;
        if frame_size == self.config.frame_size {
            return Ok(());
        }

        self.config.frame_size = frame_size;
        self.frame = vec![0.0; frame_size];
        self.transform.resize(frame_size);
        self.reset_onsets();
        Ok(())
    }

    /// Change the sampling frequency; clears onset history
    pub fn set_sampling_frequency(&mut self, sampling_frequency: f32) -> Result<()> {
        config::check_sampling_frequency(sampling_frequency)?;
        if sampling_frequency == self.config.sampling_frequency {
            return Ok(());
        }

        self.config.sampling_frequency = sampling_frequency;
        self.reset_onsets();
        Ok(())
    }

    /// Select the window used from the next frame on
    pub fn set_window(&mut self, window: WindowType) {
        self.config.window = window;
        self.transform.set_window(window);
    }

    pub fn set_rolloff_threshold(&mut self, threshold: f32) -> Result<()> {
        config::check_rolloff_threshold(threshold)?;
        self.config.rolloff_threshold = threshold;
        Ok(())
    }

    pub fn set_yin_threshold(&mut self, threshold: f32) -> Result<()> {
        config::check_yin_threshold(threshold)?;
        self.config.yin_threshold = threshold;
        self.yin.set_threshold(threshold);
        Ok(())
    }

    pub fn set_yin_max_frequency(&mut self, max_frequency: Option<f32>) -> Result<()> {
        config::check_yin_max_frequency(max_frequency)?;
        self.config.yin_max_frequency = max_frequency;
        self.yin.set_max_frequency(max_frequency);
        Ok(())
    }

    /// Change the mel band count; must still cover the configured MFCC count
    pub fn set_mel_bands(&mut self, bands: usize) -> Result<()> {
        config::check_mel_bands(bands)?;
        config::check_mfcc_count(self.config.mfcc_count, bands, self.config.skip_zeroth_mfcc)?;
        self.config.mel_bands = bands;
        self.mfcc.set_bands(bands);
        Ok(())
    }

    pub fn set_mfcc_count(&mut self, count: usize) -> Result<()> {
        config::check_mfcc_count(count, self.config.mel_bands, self.config.skip_zeroth_mfcc)?;
        self.config.mfcc_count = count;
        Ok(())
    }

    pub fn set_skip_zeroth_mfcc(&mut self, skip: bool) -> Result<()> {
        config::check_mfcc_count(self.config.mfcc_count, self.config.mel_bands, skip)?;
        self.config.skip_zeroth_mfcc = skip;
        Ok(())
    }

    fn reset_onsets(&mut self) {
        tracing::debug!(
            frame_size = self.config.frame_size,
            sampling_frequency = self.config.sampling_frequency,
            "Configuration changed, resetting onset history"
        );
        self.onset.reset(self.config.spectrum_len());
        self.onset_values = OnsetValues::default();
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Analyze a new frame of exactly `frame_size` samples
    ///
    /// On a length mismatch nothing is modified.
    pub fn process_frame(&mut self, samples: &[f32]) -> Result<()> {
        self.transform.compute(samples)?;
        self.frame.copy_from_slice(samples);
        self.onset_values = self
            .onset
            .process(self.transform.magnitudes(), self.transform.phases());
        self.frames_processed += 1;

        tracing::trace!(frame = self.frames_processed, "Processed frame");
        Ok(())
    }

    /// Return every cache to silence without touching the configuration
    pub fn reset(&mut self) {
        self.frame.fill(0.0);
        self.transform.clear();
        self.onset.reset(self.config.spectrum_len());
        self.onset_values = OnsetValues::default();
        self.frames_processed = 0;
    }

    /// Number of frames processed since creation or the last reset
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// The most recently processed frame
    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    /// Magnitude spectrum of the current frame (`frame_size / 2 + 1` bins)
    pub fn magnitude_spectrum(&self) -> &[f32] {
        self.transform.magnitudes()
    }

    /// Phase spectrum of the current frame (`frame_size / 2 + 1` bins)
    pub fn phase_spectrum(&self) -> &[f32] {
        self.transform.phases()
    }

    // ------------------------------------------------------------------
    // Time domain
    // ------------------------------------------------------------------

    pub fn rms(&self) -> f32 {
        time_domain::rms(&self.frame)
    }

    pub fn peak_energy(&self) -> f32 {
        time_domain::peak_energy(&self.frame)
    }

    pub fn zero_crossing_rate(&self) -> f32 {
        time_domain::zero_crossing_rate(&self.frame)
    }

    // ------------------------------------------------------------------
    // Frequency domain
    // ------------------------------------------------------------------

    /// Spectral centroid in Hz
    pub fn spectral_centroid(&self) -> f32 {
        frequency_domain::spectral_centroid(
            self.transform.magnitudes(),
            self.config.sampling_frequency,
            self.config.frame_size,
        )
    }

    pub fn spectral_crest(&self) -> f32 {
        frequency_domain::spectral_crest(self.transform.magnitudes())
    }

    pub fn spectral_flatness(&self) -> f32 {
        frequency_domain::spectral_flatness(self.transform.magnitudes())
    }

    /// Spectral rolloff frequency in Hz
    pub fn spectral_rolloff(&self) -> f32 {
        frequency_domain::spectral_rolloff(
            self.transform.magnitudes(),
            self.config.sampling_frequency,
            self.config.frame_size,
            self.config.rolloff_threshold,
        )
    }

    pub fn spectral_kurtosis(&self) -> f32 {
        frequency_domain::spectral_kurtosis(self.transform.magnitudes())
    }

    // ------------------------------------------------------------------
    // Onset detection functions
    // ------------------------------------------------------------------

    /// All onset function values of the current frame
    pub fn onset_values(&self) -> OnsetValues {
        self.onset_values
    }

    pub fn energy_difference(&self) -> f32 {
        self.onset_values.energy_difference
    }

    pub fn spectral_difference(&self) -> f32 {
        self.onset_values.spectral_difference
    }

    pub fn spectral_difference_hwr(&self) -> f32 {
        self.onset_values.spectral_difference_hwr
    }

    pub fn complex_spectral_difference(&self) -> f32 {
        self.onset_values.complex_spectral_difference
    }

    pub fn high_frequency_content(&self) -> f32 {
        self.onset_values.high_frequency_content
    }

    // ------------------------------------------------------------------
    // Pitch
    // ------------------------------------------------------------------

    /// YIN pitch estimate in Hz, 0.0 when no period is found
    pub fn pitch(&self) -> f32 {
        self.yin.estimate(&self.frame, self.config.sampling_frequency)
    }

    // ------------------------------------------------------------------
    // Mel spectrum and MFCCs
    // ------------------------------------------------------------------
    //
    // These take `&mut self` because the filterbank is checked against the
    // current (frame size, sampling frequency, bands) on every access and
    // rebuilt in place when any of them changed. Setters never touch it.

    /// Magnitude spectrum projected onto the mel filterbank
    pub fn mel_frequency_spectrum(&mut self) -> Vec<f32> {
        self.mfcc.mel_spectrum(
            self.transform.magnitudes(),
            self.config.frame_size,
            self.config.sampling_frequency,
        )
    }

    /// The configured number of MFCCs
    pub fn mfccs(&mut self) -> Result<Vec<f32>> {
        self.mfccs_with_count(self.config.mfcc_count)
    }

    /// A specific number of MFCCs; fails if the mel bands cannot supply them
    pub fn mfccs_with_count(&mut self, count: usize) -> Result<Vec<f32>> {
        self.mfcc.coefficients(
            self.transform.magnitudes(),
            self.config.frame_size,
            self.config.sampling_frequency,
            count,
            self.config.skip_zeroth_mfcc,
        )
    }

    /// Snapshot of every scalar feature of the current frame
    pub fn features(&self) -> FeatureSet {
        FeatureSet {
            rms: self.rms(),
            peak_energy: self.peak_energy(),
            zero_crossing_rate: self.zero_crossing_rate(),
            spectral_centroid: self.spectral_centroid(),
            spectral_crest: self.spectral_crest(),
            spectral_flatness: self.spectral_flatness(),
            spectral_rolloff: self.spectral_rolloff(),
            spectral_kurtosis: self.spectral_kurtosis(),
            onset: self.onset_values,
            pitch: self.pitch(),
        }
    }
}
