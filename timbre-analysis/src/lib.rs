//! Real-time audio feature extraction
//!
//! Computes time-domain, spectral, onset-detection, pitch (YIN) and MFCC
//! descriptors over fixed-size mono frames. One windowed FFT per frame is
//! shared by every frequency-domain feature.

mod analyzer;
mod config;
mod error;
pub mod frequency_domain;
mod mfcc;
mod onset;
mod pitch;
mod spectrum;
pub mod time_domain;
mod window;

pub use analyzer::{FeatureSet, FrameAnalyzer};
pub use config::{
    AnalyzerConfig, DEFAULT_FRAME_SIZE, DEFAULT_MEL_BANDS, DEFAULT_MFCC_COUNT,
    DEFAULT_ROLLOFF_THRESHOLD, DEFAULT_SAMPLING_FREQUENCY, DEFAULT_YIN_THRESHOLD,
};
pub use error::{ConfigError, Result};
pub use mfcc::{hz_to_mel, mel_to_hz, MelFilterbank, Mfcc};
pub use onset::{principal_argument, OnsetDetector, OnsetValues};
pub use pitch::{cumulative_mean_normalized_difference, Yin};
pub use spectrum::SpectralTransform;
pub use window::WindowType;
