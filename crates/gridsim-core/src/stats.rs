// Small descriptive-statistics helpers over `f64` slices.

/// Mean and standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub stdev: f64,
}

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean and population standard deviation (N denominator).
///
/// Returns `None` for an empty slice.
pub fn moments(values: &[f64]) -> Option<Moments> {
    let mean = mean(values)?;
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(Moments {
        mean,
        stdev: variance.sqrt(),
    })
}

/// Harmonic mean of strictly positive values.
///
/// Returns `None` for an empty slice or if any value is not > 0.
pub fn harmonic_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| *v <= 0.0) {
        return None;
    }
    let reciprocal_sum: f64 = values.iter().map(|v| 1.0 / v).sum();
    Some(values.len() as f64 / reciprocal_sum)
}
