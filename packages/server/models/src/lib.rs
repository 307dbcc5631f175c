#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the demand server.
//!
//! The grid prediction endpoint speaks the grid types directly. The types
//! here belong to the map-facing heatmap endpoint and the health check.

use foodlink_grid_models::{GridCell, GridRequest};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters for the heatmap endpoint.
///
/// Missing values fall back to a box covering India at 30x30.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeatmapQueryParams {
    /// Southern latitude bound.
    pub min_lat: Option<f64>,
    /// Northern latitude bound.
    pub max_lat: Option<f64>,
    /// Western longitude bound.
    pub min_lon: Option<f64>,
    /// Eastern longitude bound.
    pub max_lon: Option<f64>,
    /// Number of latitude samples.
    pub rows: Option<usize>,
    /// Number of longitude samples.
    pub cols: Option<usize>,
    /// Population density assumed at every point.
    pub pop_density: Option<f64>,
    /// Event flag, 0 or 1.
    pub has_event: Option<u8>,
    /// Temperature in Celsius.
    pub temp: Option<f64>,
    /// Hour of day.
    pub hour: Option<u32>,
    /// Day of week.
    pub dayofweek: Option<u32>,
}

impl From<HeatmapQueryParams> for GridRequest {
    fn from(params: HeatmapQueryParams) -> Self {
        Self {
            min_lat: params.min_lat.unwrap_or(8.0),
            max_lat: params.max_lat.unwrap_or(37.0),
            min_lon: params.min_lon.unwrap_or(68.0),
            max_lon: params.max_lon.unwrap_or(97.0),
            rows: params.rows.unwrap_or(30),
            cols: params.cols.unwrap_or(30),
            pop_density_default: params.pop_density.unwrap_or(1000.0),
            has_event: params.has_event.unwrap_or(0),
            temp_celsius: params.temp.unwrap_or(30.0),
            hour: params.hour.unwrap_or(12),
            dayofweek: params.dayofweek.unwrap_or(2),
        }
    }
}

/// Which scorer produced a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    /// The trained demand model.
    Ml,
    /// The distance-from-center placeholder.
    Synthetic,
}

/// Heatmap endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapResponse {
    /// `[lat, lon, intensity]` triples for the map heat layer.
    pub heat: Vec<[f64; 3]>,
    /// The full scored cells.
    pub raw: Vec<GridCell>,
    /// Which scorer produced the cells.
    pub used: ScoreSource,
}

impl HeatmapResponse {
    /// Wraps scored cells, deriving the heat layer from them.
    #[must_use]
    pub fn new(raw: Vec<GridCell>, used: ScoreSource) -> Self {
        let heat = raw
            .iter()
            .map(|cell| [cell.lat, cell.lon, cell.intensity])
            .collect();
        Self { heat, raw, used }
    }
}
