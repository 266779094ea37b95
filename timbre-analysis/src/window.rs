//! Analysis window functions applied before the FFT

use std::f32::consts::PI;

/// Fraction of a Tukey window spent in the cosine tapers
const TUKEY_TAPER: f32 = 0.5;

/// Window shape applied to each frame before the spectral transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// No tapering, every coefficient is 1.0
    Rectangular,
    /// Raised cosine with a 0.08 pedestal
    Hamming,
    /// Raised cosine reaching zero at both ends
    #[default]
    Hanning,
    /// Three-term cosine window with low sidelobes
    Blackman,
    /// Flat top with cosine tapers over half the window
    Tukey,
}

impl WindowType {
    /// Compute the coefficient sequence for a window of `size` samples
    ///
    /// Uses the symmetric definition (normalized over `size - 1`). A window of
    /// one sample is always `[1.0]`.
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        if size <= 1 {
            return vec![1.0; size];
        }

        let last = (size - 1) as f32;
        (0..size)
            .map(|n| {
                let x = n as f32 / last;
                match self {
                    WindowType::Rectangular => 1.0,
                    WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                    WindowType::Hanning => 0.5 * (1.0 - (2.0 * PI * x).cos()),
                    WindowType::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                    WindowType::Tukey => tukey(x),
                }
            })
            .collect()
    }
}

/// Tukey window value at normalized position `x` in [0, 1]
fn tukey(x: f32) -> f32 {
    let edge = TUKEY_TAPER / 2.0;
    if x < edge {
        0.5 * (1.0 + (PI * (x / edge - 1.0)).cos())
    } else if x > 1.0 - edge {
        0.5 * (1.0 + (PI * ((x - 1.0) / edge + 1.0)).cos())
    } else {
        1.0
    }
}
