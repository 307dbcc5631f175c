#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid request and scored grid response types.
//!
//! These are the JSON shapes of the grid prediction endpoint. Field names
//! are `snake_case` on the wire to match the existing heatmap frontend.

use serde::{Deserialize, Serialize};

const fn default_dimension() -> usize {
    20
}

const fn default_pop_density() -> f64 {
    1000.0
}

const fn default_temp_celsius() -> f64 {
    30.0
}

const fn default_hour() -> u32 {
    12
}

const fn default_dayofweek() -> u32 {
    2
}

/// A bounding box to sample plus the context applied to every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRequest {
    /// Southern latitude bound.
    pub min_lat: f64,
    /// Northern latitude bound.
    pub max_lat: f64,
    /// Western longitude bound.
    pub min_lon: f64,
    /// Eastern longitude bound.
    pub max_lon: f64,
    /// Number of latitude samples.
    #[serde(default = "default_dimension")]
    pub rows: usize,
    /// Number of longitude samples.
    #[serde(default = "default_dimension")]
    pub cols: usize,
    /// Population density assumed at every point (persons/km²).
    #[serde(default = "default_pop_density")]
    pub pop_density_default: f64,
    /// Event flag, 0 or 1.
    #[serde(default)]
    pub has_event: u8,
    /// Temperature in Celsius.
    #[serde(default = "default_temp_celsius")]
    pub temp_celsius: f64,
    /// Hour of day.
    #[serde(default = "default_hour")]
    pub hour: u32,
    /// Day of week.
    #[serde(default = "default_dayofweek")]
    pub dayofweek: u32,
}

impl GridRequest {
    /// Creates a request for the given bounds with default resolution and
    /// context.
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            rows: default_dimension(),
            cols: default_dimension(),
            pop_density_default: default_pop_density(),
            has_event: 0,
            temp_celsius: default_temp_celsius(),
            hour: default_hour(),
            dayofweek: default_dayofweek(),
        }
    }

    /// Sets the lattice resolution.
    #[must_use]
    pub const fn with_resolution(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }
}

/// One scored lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Latitude index, `0..rows`.
    pub row: usize,
    /// Longitude index, `0..cols`.
    pub col: usize,
    /// Latitude of the point.
    pub lat: f64,
    /// Longitude of the point.
    pub lon: f64,
    /// Raw predicted demand.
    pub score: f64,
    /// Score min-max normalized across the request, in `[0, 1]`.
    pub intensity: f64,
}

/// Raw score range of one response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    /// Lowest raw score.
    pub min: f64,
    /// Highest raw score.
    pub max: f64,
}

/// A fully scored grid, cells in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse {
    /// Every lattice point.
    pub cells: Vec<GridCell>,
    /// Raw score range.
    pub summary: GridSummary,
}
