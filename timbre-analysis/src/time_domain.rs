//! Time-domain features computed directly on the raw frame

/// Root mean square of the frame; 0.0 for an empty frame
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}

/// Largest absolute sample value in the frame
pub fn peak_energy(frame: &[f32]) -> f32 {
    frame.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Sign changes between consecutive samples, divided by the frame length
///
/// Samples exactly at zero carry no sign: they are skipped, and the next
/// non-zero sample is compared against the last non-zero one.
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let mut crossings = 0u32;
    let mut previous_positive: Option<bool> = None;

    for &sample in frame {
        if sample == 0.0 {
            continue;
        }
        let positive = sample > 0.0;
        if previous_positive.is_some_and(|p| p != positive) {
            crossings += 1;
        }
        previous_positive = Some(positive);
    }

    crossings as f32 / frame.len() as f32
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

    #[test]
    fn test_rms_of_constant() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert!((rms(&[-0.5; 100]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_sine() {
        let frame = sine(1000.0, 48000.0, 4800);
        let expected = 1.0 / 2.0f32.sqrt();
        assert!((rms(&frame) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_peak_energy() {
        assert_eq!(peak_energy(&[0.1, -0.9, 0.5]), 0.9);
        assert_eq!(peak_energy(&[0.0; 16]), 0.0);
    }

    #[test]
    fn test_rms_never_exceeds_peak() {
        let frames = [
            sine(440.0, 44100.0, 512),
            vec![0.0, 0.0, 1.0, 0.0],
            vec![-0.25; 10],
        ];
        for frame in &frames {
            let r = rms(frame);
            let p = peak_energy(frame);
            assert!(r >= 0.0 && p >= 0.0);
            assert!(r <= p + 1e-6, "rms {} should not exceed peak {}", r, p);
        }
    }

    #[test]
    fn test_empty_frame() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(peak_energy(&[]), 0.0);
        assert_eq!(zero_crossing_rate(&[]), 0.0);
    }

    #[test]
    fn test_zcr_alternating() {
        let frame: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!((zero_crossing_rate(&frame) - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_zcr_skips_zero_samples() {
        // 1 -> 0 -> 1 is not a crossing, 1 -> 0 -> -1 is exactly one
        assert_eq!(zero_crossing_rate(&[1.0, 0.0, 1.0, 1.0]), 0.0);
        assert_eq!(zero_crossing_rate(&[1.0, 0.0, -1.0, -1.0]), 0.25);
        assert_eq!(zero_crossing_rate(&[0.0; 8]), 0.0);
    }

    #[test]
    fn test_zcr_of_sine() {
        let sample_rate = 48000.0;
        let freq = 375.0; // exactly 8 cycles in 1024 samples
        let frame = sine(freq, sample_rate, 1024);
        let expected = 2.0 * freq / sample_rate;
        let zcr = zero_crossing_rate(&frame);
        assert!(
            (zcr - expected).abs() <= 2.0 / 1024.0,
            "zcr {} expected about {}",
            zcr,
            expected
        );
    }
}
