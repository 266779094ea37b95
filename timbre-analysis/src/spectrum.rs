//! Windowed FFT producing the cached magnitude and phase spectrum of a frame

use crate::error::{ConfigError, Result};
use crate::window::WindowType;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Forward spectral transform with a cached result
///
/// Holds the FFT plan, the window coefficients for the current frame size,
/// and the magnitude/phase of the most recently transformed frame. Only the
/// non-negative frequency bins (`frame_size / 2 + 1`) are kept.
pub struct SpectralTransform {
    frame_size: usize,
    window_type: WindowType,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Pre-allocated FFT buffer to avoid allocation in compute()
    fft_buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    phases: Vec<f32>,
}

impl SpectralTransform {
    /// Create a transform for frames of `frame_size` samples
    pub fn new(frame_size: usize, window_type: WindowType) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);
        let bins = frame_size / 2 + 1;

        Self {
            frame_size,
            window_type,
            fft,
            window: window_type.coefficients(frame_size),
            fft_buffer: vec![Complex::new(0.0, 0.0); frame_size],
            magnitudes: vec![0.0; bins],
            phases: vec![0.0; bins],
        }
    }

    /// Replan for a new frame size; the cached spectrum becomes silence
    pub fn resize(&mut self, frame_size: usize) {
        if frame_size == self.frame_size {
            return;
        }
        tracing::debug!(
            from = self.frame_size,
            to = frame_size,
            "Replanning FFT for new frame size"
        );
        *self = Self::new(frame_size, self.window_type);
    }

    /// Switch window function; takes effect from the next computed frame
    pub fn set_window(&mut self, window_type: WindowType) {
        if window_type == self.window_type {
            return;
        }
        self.window_type = window_type;
        self.window = window_type.coefficients(self.frame_size);
    }

    /// Window the frame, run the FFT, and overwrite the cached spectrum
    pub fn compute(&mut self, frame: &[f32]) -> Result<()> {
        if frame.len() != self.frame_size {
            return Err(ConfigError::FrameLength {
                expected: self.frame_size,
                actual: frame.len(),
            });
        }

        for ((slot, &sample), &w) in self.fft_buffer.iter_mut().zip(frame).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let bins = self.fft_buffer[..self.magnitudes.len()].iter();
        for ((mag, phase), bin) in self.magnitudes.iter_mut().zip(&mut self.phases).zip(bins) {
            *mag = bin.norm();
            *phase = bin.arg();
        }

        Ok(())
    }

    /// Reset the cached spectrum to silence
    pub fn clear(&mut self) {
        self.magnitudes.fill(0.0);
        self.phases.fill(0.0);
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Magnitude per bin of the last computed frame
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Phase per bin of the last computed frame, in (-pi, pi]
    pub fn phases(&self) -> &[f32] {
        &self.phases
    }
}
