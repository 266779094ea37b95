//! Frequency-domain features computed on a magnitude spectrum
//!
//! Every function returns 0.0 for a silent (all-zero) spectrum instead of
//! NaN or infinity. Sums run in f64 so that large frames stay accurate.

/// Offset added to magnitudes before taking logarithms
const LOG_FLOOR: f64 = 1e-10;

/// Centre frequency in Hz of spectrum bin `bin`
#[inline]
pub fn bin_frequency(bin: usize, sampling_frequency: f32, frame_size: usize) -> f32 {
    bin as f32 * sampling_frequency / frame_size as f32
}

fn mean(spectrum: &[f32]) -> f64 {
    if spectrum.is_empty() {
        return 0.0;
    }
    spectrum.iter().map(|&m| m as f64).sum::<f64>() / spectrum.len() as f64
}

/// Magnitude-weighted mean frequency in Hz
pub fn spectral_centroid(spectrum: &[f32], sampling_frequency: f32, frame_size: usize) -> f32 {
    let mut weighted = 0.0f64;
    let mut total = 0.0f64;
    for (k, &m) in spectrum.iter().enumerate() {
        weighted += bin_frequency(k, sampling_frequency, frame_size) as f64 * m as f64;
        total += m as f64;
    }

    if total > 0.0 {
        (weighted / total) as f32
    } else {
        0.0
    }
}

/// Ratio of the largest magnitude to the mean magnitude
pub fn spectral_crest(spectrum: &[f32]) -> f32 {
    let mean = mean(spectrum);
    if mean <= 0.0 {
        return 0.0;
    }
    let max = spectrum.iter().copied().fold(0.0f32, f32::max);
    (max as f64 / mean) as f32
}

/// Geometric mean over arithmetic mean, computed in the log domain
///
/// Close to 1.0 for noise-like spectra, close to 0.0 for tonal ones.
pub fn spectral_flatness(spectrum: &[f32]) -> f32 {
    let arithmetic = mean(spectrum);
    if arithmetic <= 0.0 {
        return 0.0;
    }
    let log_mean = spectrum
        .iter()
        .map(|&m| (m as f64 + LOG_FLOOR).ln())
        .sum::<f64>()
        / spectrum.len() as f64;

    (log_mean.exp() / arithmetic) as f32
}

/// Lowest bin frequency below which `threshold` of the total magnitude lies
pub fn spectral_rolloff(
    spectrum: &[f32],
    sampling_frequency: f32,
    frame_size: usize,
    threshold: f32,
) -> f32 {
    let total: f64 = spectrum.iter().map(|&m| m as f64).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let target = threshold as f64 * total;
    let mut cumulative = 0.0f64;
    for (k, &m) in spectrum.iter().enumerate() {
        cumulative += m as f64;
        if cumulative >= target {
            return bin_frequency(k, sampling_frequency, frame_size);
        }
    }

    // Rounding can leave the final sum a hair under the target
    bin_frequency(spectrum.len() - 1, sampling_frequency, frame_size)
}

/// Excess kurtosis of the magnitude distribution across bins
pub fn spectral_kurtosis(spectrum: &[f32]) -> f32 {
    let mu = mean(spectrum);
    let n = spectrum.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mut m2 = 0.0f64;
    let mut m4 = 0.0f64;
    for &m in spectrum {
        let d = m as f64 - mu;
        let d2 = d * d;
        m2 += d2;
        m4 += d2 * d2;
    }
    let variance = m2 / n;

    // Zero-variance spectra (including silence) have no defined kurtosis
    if variance <= f64::EPSILON * mu * mu {
        return 0.0;
    }

    ((m4 / n) / (variance * variance) - 3.0) as f32
}
