//! Onset detection functions
//!
//! Each function compares the current frame's spectrum with the history kept
//! from earlier frames. All five are evaluated together once per frame, then
//! the history is advanced, so repeated reads between frames agree.

use std::f32::consts::PI;

/// Onset detection function values for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnsetValues {
    /// Rise in total spectral energy, never negative
    pub energy_difference: f32,
    /// Sum of squared bin-wise magnitude changes
    pub spectral_difference: f32,
    /// Sum of squared bin-wise magnitude increases only
    pub spectral_difference_hwr: f32,
    /// Distance between each complex bin and its phase-extrapolated prediction
    pub complex_spectral_difference: f32,
    /// Energy weighted by bin index
    pub high_frequency_content: f32,
}

/// Frame-to-frame history for the onset detection functions
///
/// Starts out silent: the first frame is compared against zero energy, zero
/// magnitude and zero phase.
pub struct OnsetDetector {
    previous_energy: f32,
    previous_magnitudes: Vec<f32>,
    previous_phases: Vec<f32>,
    /// Phases from two frames back, for phase-velocity extrapolation
    older_phases: Vec<f32>,
}

impl OnsetDetector {
    /// Create a detector for spectra with `bins` bins
    pub fn new(bins: usize) -> Self {
        Self {
            previous_energy: 0.0,
            previous_magnitudes: vec![0.0; bins],
            previous_phases: vec![0.0; bins],
            older_phases: vec![0.0; bins],
        }
    }

    /// Forget all history and adopt a (possibly new) spectrum length
    pub fn reset(&mut self, bins: usize) {
        *self = Self::new(bins);
    }

    /// Evaluate every onset function for this frame, then store it as history
    pub fn process(&mut self, magnitudes: &[f32], phases: &[f32]) -> OnsetValues {
        debug_assert_eq!(magnitudes.len(), phases.len());
        if magnitudes.len() != self.previous_magnitudes.len() {
            tracing::debug!(
                bins = magnitudes.len(),
                "Spectrum length changed, resetting onset history"
            );
            self.reset(magnitudes.len());
        }

        let mut energy = 0.0f32;
        let mut spectral_difference = 0.0f32;
        let mut spectral_difference_hwr = 0.0f32;
        let mut complex_spectral_difference = 0.0f32;
        let mut high_frequency_content = 0.0f32;

        for k in 0..magnitudes.len() {
            let magnitude = magnitudes[k];
            let previous = self.previous_magnitudes[k];
            let power = magnitude * magnitude;

            energy += power;
            high_frequency_content += k as f32 * power;

            let diff = magnitude - previous;
            spectral_difference += diff * diff;
            if diff > 0.0 {
                spectral_difference_hwr += diff * diff;
            }

            // Predicted phase continues the previous frame's phase advance
            let predicted_phase = 2.0 * self.previous_phases[k] - self.older_phases[k];
            let deviation = principal_argument(phases[k] - predicted_phase);
            let distance_sq = power + previous * previous
                - 2.0 * magnitude * previous * deviation.cos();
            complex_spectral_difference += distance_sq.max(0.0).sqrt();
        }

        let energy_difference = (energy - self.previous_energy).max(0.0);

        self.previous_energy = energy;
        self.previous_magnitudes.copy_from_slice(magnitudes);
        std::mem::swap(&mut self.older_phases, &mut self.previous_phases);
        self.previous_phases.copy_from_slice(phases);

        OnsetValues {
            energy_difference,
            spectral_difference,
            spectral_difference_hwr,
            complex_spectral_difference,
            high_frequency_content,
        }
    }
}

/// Wrap a phase to the interval (-pi, pi]
pub fn principal_argument(phase: f32) -> f32 {
    let wrapped = (phase + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(bins: usize) -> Vec<f32> {
        (0..bins).map(|k| 1.0 + k as f32 * 0.1).collect()
    }

    #[test]
    fn test_principal_argument() {
        assert!((principal_argument(0.5) - 0.5).abs() < 1e-6);
        assert!((principal_argument(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert!((principal_argument(-2.0 * PI - 0.5) + 0.5).abs() < 1e-5);
        assert!((principal_argument(-PI) - PI).abs() < 1e-6);
        assert!((principal_argument(PI) - PI).abs() < 1e-6);
    }

    #[test]
    fn test_first_frame_against_silence() {
        let mut detector = OnsetDetector::new(4);
        let mags = [1.0, 2.0, 0.0, 3.0];
        let values = detector.process(&mags, &[0.3, -1.0, 0.0, 2.0]);

        assert!((values.energy_difference - 14.0).abs() < 1e-5);
        assert!((values.spectral_difference - 14.0).abs() < 1e-5);
        assert!((values.spectral_difference_hwr - 14.0).abs() < 1e-5);
        // Nothing to predict from, so the distance is the raw magnitude
        assert!((values.complex_spectral_difference - 6.0).abs() < 1e-5);
        assert!((values.high_frequency_content - (4.0 + 27.0)).abs() < 1e-5);
    }

    #[test]
    fn test_identical_frames_give_no_onset() {
        let mut detector = OnsetDetector::new(16);
        let mags = ramp(16);
        let phases: Vec<f32> = (0..16).map(|k| k as f32 * 0.2 - 1.5).collect();

        detector.process(&mags, &phases);
        let second = detector.process(&mags, &phases);
        assert_eq!(second.energy_difference, 0.0);
        assert_eq!(second.spectral_difference, 0.0);
        assert_eq!(second.spectral_difference_hwr, 0.0);

        // Phase prediction needs two frames of history
        let third = detector.process(&mags, &phases);
        assert!(third.complex_spectral_difference.abs() < 1e-4);
    }

    #[test]
    fn test_steady_phase_advance_is_predicted() {
        let mut detector = OnsetDetector::new(8);
        let mags = vec![1.0f32; 8];
        let step = 0.7f32;

        let phases_at = |frame: usize| -> Vec<f32> {
            (0..8)
                .map(|k| principal_argument(frame as f32 * step * (k + 1) as f32))
                .collect()
        };
        for frame in 0..3 {
            detector.process(&mags, &phases_at(frame));
        }
        let last = detector.process(&mags, &phases_at(3));
        assert!(last.complex_spectral_difference < 1e-3);
    }

    #[test]
    fn test_hwr_ignores_decreases() {
        let mut detector = OnsetDetector::new(3);
        let phases = [0.0; 3];
        detector.process(&[2.0, 2.0, 2.0], &phases);
        let values = detector.process(&[1.0, 2.0, 4.0], &phases);

        assert!((values.spectral_difference - 5.0).abs() < 1e-6);
        assert!((values.spectral_difference_hwr - 4.0).abs() < 1e-6);
        // Energy went from 12 to 21
        assert!((values.energy_difference - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_energy_difference_is_rectified() {
        let mut detector = OnsetDetector::new(2);
        let phases = [0.0; 2];
        detector.process(&[3.0, 3.0], &phases);
        let values = detector.process(&[1.0, 1.0], &phases);
        assert_eq!(values.energy_difference, 0.0);
        assert!(values.spectral_difference > 0.0);
        assert_eq!(values.spectral_difference_hwr, 0.0);
    }

    #[test]
    fn test_length_change_resets_history() {
        let mut detector = OnsetDetector::new(4);
        detector.process(&[1.0; 4], &[0.0; 4]);
        let values = detector.process(&[1.0; 6], &[0.0; 6]);
        // Compared against silence again
        assert!((values.spectral_difference - 6.0).abs() < 1e-6);
    }
}
