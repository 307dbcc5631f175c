//! Regression metrics for held-out evaluation.
//!
//! All functions return `0.0` for empty input and expect `predictions`
//! and `targets` to have equal length.

/// Root mean squared error: `sqrt(mean((p - t)²))`. Lower is better.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let mse = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>()
        / predictions.len() as f64;
    mse.sqrt()
}

/// Mean absolute error: `mean(|p - t|)`. Lower is better.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mae(predictions: &[f64], targets: &[f64]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / predictions.len() as f64
}

/// Coefficient of determination: `1 - SS_res / SS_tot`. Higher is better.
///
/// Returns `0.0` when the targets have no variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn r2(predictions: &[f64], targets: &[f64]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let ss_tot: f64 = targets.iter().map(|t| (t - mean) * (t - mean)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (t - p) * (t - p))
        .sum();
    1.0 - ss_res / ss_tot
}
