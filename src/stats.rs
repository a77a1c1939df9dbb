//! Small numeric helpers for component-level derived statistics.
//!
//! These are computed eagerly, once, from a component's final pixel lists —
//! never lazily from mutable sentinel fields, and never with the doubled
//! accumulator (`squared_sum += squared_sum + ...`) the Python original used
//! for variance.

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Median, averaging the middle two for even-length input. Returns `0.0` for
/// an empty slice.
pub fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Population variance (sum of squared deviations from the mean, divided by
/// `n`). Returns `0.0` for an empty slice.
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let squared_sum: f32 = values.iter().map(|v| (v - m).powi(2)).sum();
    squared_sum / values.len() as f32
}
