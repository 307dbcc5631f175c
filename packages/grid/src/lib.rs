#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demand grid scoring.
//!
//! A [`GridRequest`] describes a bounding box and a handful of scalar
//! context values. [`score_grid`] samples the box on a regular lattice,
//! builds one feature vector per point, scores every point with a single
//! batched model call, and min-max normalizes the results into
//! intensities. The scorer holds no state between calls.

mod fallback;

use foodlink_demand_models::FeatureVector;
use foodlink_grid_models::{GridCell, GridRequest, GridResponse, GridSummary};
use foodlink_model::{DemandModel, ModelError};
use thiserror::Error;

pub use fallback::synthetic_grid;

/// Score ranges narrower than this normalize to all-zero intensities.
pub const FLAT_RANGE_TOLERANCE: f64 = 1e-6;

/// Largest lattice a single request may ask for (500x500).
pub const MAX_CELLS: usize = 250_000;

/// Errors that can occur while scoring a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// The request is malformed; only this request is rejected.
    #[error("Invalid grid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// The model failed to score the lattice.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The model returned the wrong number of scores.
    #[error("Model returned {actual} scores for {expected} grid points")]
    PredictionCount {
        /// Number of lattice points submitted.
        expected: usize,
        /// Number of scores returned.
        actual: usize,
    },
}

fn invalid(message: impl Into<String>) -> GridError {
    GridError::InvalidRequest {
        message: message.into(),
    }
}

/// Checks that `request` describes a lattice that can be scored.
///
/// Bounds may be equal (a degenerate axis) or reversed; neither is an
/// error.
///
/// # Errors
///
/// Returns [`GridError::InvalidRequest`] if a bound or context value is
/// not finite, `rows` or `cols` is zero, the lattice exceeds
/// [`MAX_CELLS`], or `has_event` is not 0 or 1.
pub fn validate(request: &GridRequest) -> Result<(), GridError> {
    let finite = [
        ("min_lat", request.min_lat),
        ("max_lat", request.max_lat),
        ("min_lon", request.min_lon),
        ("max_lon", request.max_lon),
        ("pop_density_default", request.pop_density_default),
        ("temp_celsius", request.temp_celsius),
    ];
    if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
        return Err(invalid(format!("{name} must be finite, got {value}")));
    }

    if request.rows == 0 || request.cols == 0 {
        return Err(invalid(format!(
            "rows and cols must be positive, got {}x{}",
            request.rows, request.cols
        )));
    }

    match request.rows.checked_mul(request.cols) {
        Some(n) if n <= MAX_CELLS => {}
        _ => {
            return Err(invalid(format!(
                "{}x{} grid exceeds the {MAX_CELLS} cell limit",
                request.rows, request.cols
            )));
        }
    }

    if request.has_event > 1 {
        return Err(invalid(format!(
            "has_event must be 0 or 1, got {}",
            request.has_event
        )));
    }

    Ok(())
}

/// Returns `n` evenly spaced values from `start` to `end`, both included.
///
/// `n == 1` yields `[start]` and `n == 0` yields nothing.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| (i as f64).mul_add(step, start)).collect();
            values[n - 1] = end;
            values
        }
    }
}

/// Past donation count assumed for every point of a request.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn heuristic_past_donations(pop_density: f64) -> u32 {
    (pop_density / 100.0 * 0.5)
        .floor()
        .clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Lattice points in row-major order: `(row, col, lat, lon)`.
fn lattice(request: &GridRequest) -> Vec<(usize, usize, f64, f64)> {
    let lats = linspace(request.min_lat, request.max_lat, request.rows);
    let lons = linspace(request.min_lon, request.max_lon, request.cols);

    lats.iter()
        .enumerate()
        .flat_map(|(row, &lat)| {
            lons.iter()
                .enumerate()
                .map(move |(col, &lon)| (row, col, lat, lon))
        })
        .collect()
}

fn feature_vector(request: &GridRequest, lat: f64, lon: f64) -> FeatureVector {
    FeatureVector {
        lat,
        lon,
        pop_density: request.pop_density_default,
        has_event: request.has_event,
        temp: request.temp_celsius,
        hour: request.hour,
        dayofweek: request.dayofweek,
        past_donations: heuristic_past_donations(request.pop_density_default),
        pickups: 0,
    }
}

/// Min-max normalizes `scores` into `[0, 1]`.
///
/// Returns the intensities and the raw `(min, max)`. A range narrower
/// than [`FLAT_RANGE_TOLERANCE`] maps every score to 0.
#[must_use]
pub fn normalize(scores: &[f64]) -> (Vec<f64>, GridSummary) {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let intensities = if range < FLAT_RANGE_TOLERANCE {
        vec![0.0; scores.len()]
    } else {
        scores.iter().map(|score| (score - min) / range).collect()
    };

    (intensities, GridSummary { min, max })
}

/// Scores every point of the requested lattice with `model`.
///
/// Rows are projected onto `model.features()`, so the trained column
/// order is honored no matter how the feature vector is built.
///
/// # Errors
///
/// Returns [`GridError::InvalidRequest`] for a malformed request and
/// [`GridError::Model`] or [`GridError::PredictionCount`] if inference
/// fails. No cells are returned on error.
pub fn score_grid(
    model: &dyn DemandModel,
    request: &GridRequest,
) -> Result<GridResponse, GridError> {
    validate(request)?;

    let points = lattice(request);
    let order = model.features();
    let rows: Vec<Vec<f64>> = points
        .iter()
        .map(|&(_, _, lat, lon)| feature_vector(request, lat, lon).project(order))
        .collect();

    let scores = model.predict(&rows)?;
    if scores.len() != points.len() {
        return Err(GridError::PredictionCount {
            expected: points.len(),
            actual: scores.len(),
        });
    }

    let (intensities, summary) = normalize(&scores);
    let cells = points
        .into_iter()
        .zip(scores)
        .zip(intensities)
        .map(|(((row, col, lat, lon), score), intensity)| GridCell {
            row,
            col,
            lat,
            lon,
            score,
            intensity,
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Scored {}x{} grid (min={:.4}, max={:.4})",
        request.rows,
        request.cols,
        summary.min,
        summary.max
    );

    Ok(GridResponse { cells, summary })
}
