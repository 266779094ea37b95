//! Configuration errors raised by the analyzer

use thiserror::Error;

/// A call violated the analyzer's configuration contract.
///
/// Returned synchronously by the offending call; the analyzer's state is
/// left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Frame length mismatch: expected {expected} samples, got {actual}")]
    FrameLength { expected: usize, actual: usize },
    #[error("Sampling frequency must be positive and finite, got {0}")]
    SamplingFrequency(f32),
    #[error("Frame size must be positive, got {0}")]
    FrameSize(usize),
    #[error("Rolloff threshold must lie in (0, 1], got {0}")]
    RolloffThreshold(f32),
    #[error("YIN threshold must be positive and finite, got {0}")]
    YinThreshold(f32),
    #[error("YIN maximum frequency must be positive and finite, got {0}")]
    YinMaxFrequency(f32),
    #[error("Number of mel bands must be positive, got {0}")]
    MelBands(usize),
    #[error("Requested {requested} MFCCs but only {available} are available")]
    TooManyCoefficients { requested: usize, available: usize },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ConfigError>;
