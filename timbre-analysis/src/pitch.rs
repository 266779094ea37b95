//! Monophonic pitch estimation with the YIN algorithm
//!
//! Implements the difference-function approach of de Cheveigné & Kawahara (2002):
//! 1. Squared difference between the frame and lagged copies of itself
//! 2. Cumulative mean normalization, so lag 0 is no longer the trivial minimum
//! 3. First dip below an absolute threshold, followed down to its local minimum
//! 4. Parabolic interpolation for a sub-sample period

/// YIN pitch estimator
///
/// Holds no per-frame state; every estimate depends only on the frame passed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yin {
    threshold: f32,
    max_frequency: Option<f32>,
}

impl Yin {
    /// Create an estimator with the given absolute threshold
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            max_frequency: None,
        }
    }

    pub fn with_max_frequency(mut self, max_frequency: Option<f32>) -> Self {
        self.max_frequency = max_frequency;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn max_frequency(&self) -> Option<f32> {
        self.max_frequency
    }

    pub fn set_max_frequency(&mut self, max_frequency: Option<f32>) {
        self.max_frequency = max_frequency;
    }

    /// Estimate the fundamental frequency of `frame` in Hz
    ///
    /// Returns 0.0 when the frame has no detectable period: silent or
    /// constant frames, frames too short to search, or frames whose
    /// normalized difference never dips below 1.
    pub fn estimate(&self, frame: &[f32], sampling_frequency: f32) -> f32 {
        let cmnd = cumulative_mean_normalized_difference(frame);
        let Some(tau) = self.period_candidate(&cmnd, sampling_frequency) else {
            return 0.0;
        };

        let period = parabolic_refine(&cmnd, tau);
        if period > 0.0 {
            sampling_frequency / period
        } else {
            0.0
        }
    }

    /// Smallest lag the search may return
    fn min_lag(&self, sampling_frequency: f32) -> usize {
        match self.max_frequency {
            Some(f) => ((sampling_frequency / f).floor() as usize).max(1),
            None => 1,
        }
    }

    /// Pick the integer period from the normalized difference function
    ///
    /// Scans upward for the first lag below the threshold and follows it to the
    /// bottom of its dip. Falls back to the global minimum (earliest on ties);
    /// `None` when that minimum does not drop below 1.
    fn period_candidate(&self, cmnd: &[f32], sampling_frequency: f32) -> Option<usize> {
        // The last lag has no right neighbour to confirm a minimum
        let end = cmnd.len().checked_sub(1)?;
        let start = self.min_lag(sampling_frequency);
        if start >= end {
            return None;
        }

        let mut best = start;
        for tau in start..end {
            if cmnd[tau] < self.threshold {
                let mut tau = tau;
                while tau + 1 < end && cmnd[tau + 1] < cmnd[tau] {
                    tau += 1;
                }
                return Some(tau);
            }
            if cmnd[tau] < cmnd[best] {
                best = tau;
            }
        }

        if cmnd[best] < 1.0 {
            Some(best)
        } else {
            None
        }
    }
}

/// Cumulative mean normalized difference function over lags `0..frame.len() / 2`
///
/// `d'(0)` is 1 by definition; lags whose running sum is still zero are also 1.
pub fn cumulative_mean_normalized_difference(frame: &[f32]) -> Vec<f32> {
    let half = frame.len() / 2;
    let mut cmnd = vec![1.0f32; half];
    let mut running = 0.0f64;

    for tau in 1..half {
        let difference: f64 = frame[..half]
            .iter()
            .zip(&frame[tau..tau + half])
            .map(|(&a, &b)| {
                let d = (a - b) as f64;
                d * d
            })
            .sum();

        running += difference;
        if running > 0.0 {
            cmnd[tau] = (difference * tau as f64 / running) as f32;
        }
    }

    cmnd
}

/// Fractional period from a parabola through `tau - 1`, `tau`, `tau + 1`
fn parabolic_refine(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }

    let left = cmnd[tau - 1];
    let centre = cmnd[tau];
    let right = cmnd[tau + 1];
    let curvature = left - 2.0 * centre + right;

    // Only a convex neighbourhood has a minimum to interpolate
    if curvature <= 0.0 {
        return tau as f32;
    }

    let offset = (left - right) / (2.0 * curvature);
    tau as f32 + offset.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f32 / sample_rate).sin())
            .collect()
    }

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= expected * tolerance,
            "Expected {} within {}%, got {}",
            expected,
            tolerance * 100.0,
            actual
        );
    }

    #[test]
    fn test_sine_440_at_48k() {
        let yin = Yin::new(0.1);
        let pitch = yin.estimate(&sine(440.0, 48000.0, 1024), 48000.0);
        assert_close(pitch, 440.0, 0.01);
    }

    #[test]
    fn test_various_sines() {
        let yin = Yin::new(0.1);
        for (freq, fs) in [(220.0, 44100.0), (1000.0, 44100.0), (150.0, 16000.0)] {
            let pitch = yin.estimate(&sine(freq, fs, 2048), fs);
            assert_close(pitch, freq, 0.01);
        }
    }

    #[test]
    fn test_harmonic_tone_reports_fundamental() {
        let fs = 44100.0;
        let frame: Vec<f32> = (0..2048)
            .map(|n| {
                let t = n as f32 / fs;
                (2.0 * PI * 200.0 * t).sin()
                    + 0.5 * (2.0 * PI * 400.0 * t).sin()
                    + 0.25 * (2.0 * PI * 600.0 * t).sin()
            })
            .collect();
        let pitch = Yin::new(0.1).estimate(&frame, fs);
        assert_close(pitch, 200.0, 0.01);
    }

    #[test]
    fn test_silence_and_constant_have_no_pitch() {
        let yin = Yin::new(0.1);
        assert_eq!(yin.estimate(&[0.0; 512], 44100.0), 0.0);
        assert_eq!(yin.estimate(&[1.0; 512], 44100.0), 0.0);
        assert_eq!(yin.estimate(&[-1.0; 512], 44100.0), 0.0);
    }

    #[test]
    fn test_tiny_frames() {
        let yin = Yin::new(0.1);
        assert_eq!(yin.estimate(&[], 44100.0), 0.0);
        assert_eq!(yin.estimate(&[0.5], 44100.0), 0.0);
        assert_eq!(yin.estimate(&[0.5, -0.5, 0.5], 44100.0), 0.0);
    }

    #[test]
    fn test_cmnd_shape() {
        let cmnd = cumulative_mean_normalized_difference(&sine(441.0, 44100.0, 512));
        assert_eq!(cmnd.len(), 256);
        assert_eq!(cmnd[0], 1.0);
        // Period of 100 samples: deep dip at lag 100
        assert!(cmnd[100] < 0.01);
        assert!(cmnd[50] > 1.0);
    }

    #[test]
    fn test_max_frequency_skips_short_lags() {
        // With the search floor above the true period, the first dip found is an octave down
        let fs = 44100.0;
        let frame = sine(882.0, fs, 1024);
        let unbounded = Yin::new(0.1).estimate(&frame, fs);
        assert_close(unbounded, 882.0, 0.01);

        let bounded = Yin::new(0.1)
            .with_max_frequency(Some(600.0))
            .estimate(&frame, fs);
        assert_close(bounded, 441.0, 0.01);
    }

    #[test]
    fn test_candidate_falls_back_to_global_minimum() {
        let yin = Yin::new(0.1);
        let cmnd = [1.0, 0.9, 0.5, 0.3, 0.4, 0.2, 0.6, 0.8];
        assert_eq!(yin.period_candidate(&cmnd, 44100.0), Some(5));

        // Ties go to the earliest lag
        let cmnd = [1.0, 0.7, 0.4, 0.9, 0.4, 0.8];
        assert_eq!(yin.period_candidate(&cmnd, 44100.0), Some(2));
    }

    #[test]
    fn test_candidate_without_dip_below_one() {
        let yin = Yin::new(0.1);
        let cmnd = [1.0, 1.2, 1.5, 1.0, 1.3, 1.4];
        assert_eq!(yin.period_candidate(&cmnd, 44100.0), None);
    }

    #[test]
    fn test_noisy_tone_uses_global_minimum() {
        let fs = 44100.0;
        let mut state = 7u32;
        let frame: Vec<f32> = (0..1024)
            .map(|n| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                (2.0 * PI * 300.0 * n as f32 / fs).sin() + 0.6 * noise
            })
            .collect();

        let cmnd = cumulative_mean_normalized_difference(&frame);
        let search = &cmnd[1..cmnd.len() - 1];
        let minimum = search.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(minimum > 0.01, "Noise too weak, minimum {}", minimum);

        let argmin = 1 + search.iter().position(|&d| d == minimum).unwrap_or(0);
        let expected = fs / parabolic_refine(&cmnd, argmin);

        let pitch = Yin::new(0.01).estimate(&frame, fs);
        assert!(pitch > 0.0);
        assert_eq!(pitch, expected);
    }

    #[test]
    fn test_parabolic_refine_symmetric() {
        let cmnd = [1.0, 0.5, 0.2, 0.5, 1.0];
        assert!((parabolic_refine(&cmnd, 2) - 2.0).abs() < 1e-6);

        let cmnd = [1.0, 0.4, 0.2, 0.6, 1.0];
        let refined = parabolic_refine(&cmnd, 2);
        assert!(refined < 2.0 && refined > 1.5);
    }
}
