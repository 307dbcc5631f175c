//! Model-free grid used when inference is unavailable.

use foodlink_grid_models::{GridCell, GridRequest, GridResponse, GridSummary};

use crate::linspace;

/// Raw score assigned to a cell at full intensity.
const SYNTHETIC_SCORE_SCALE: f64 = 100.0;

/// Builds a placeholder grid whose intensity peaks at the box center and
/// falls off linearly with distance.
///
/// The lattice is the same one [`crate::score_grid`] uses. A box with zero
/// extent on both axes yields all-zero intensities.
#[must_use]
pub fn synthetic_grid(request: &GridRequest) -> GridResponse {
    let lats = linspace(request.min_lat, request.max_lat, request.rows);
    let lons = linspace(request.min_lon, request.max_lon, request.cols);

    let center_lat = f64::midpoint(request.min_lat, request.max_lat);
    let center_lon = f64::midpoint(request.min_lon, request.max_lon);
    let span = (request.max_lat - request.min_lat)
        .abs()
        .max((request.max_lon - request.min_lon).abs());

    let mut cells = Vec::with_capacity(lats.len() * lons.len());
    for (row, &lat) in lats.iter().enumerate() {
        for (col, &lon) in lons.iter().enumerate() {
            let intensity = if span > 0.0 {
                let dist = (lat - center_lat).hypot(lon - center_lon);
                (1.0 - dist / span).max(0.0)
            } else {
                0.0
            };

            cells.push(GridCell {
                row,
                col,
                lat,
                lon,
                score: intensity * SYNTHETIC_SCORE_SCALE,
                intensity,
            });
        }
    }

    GridResponse {
        cells,
        summary: GridSummary {
            min: 0.0,
            max: SYNTHETIC_SCORE_SCALE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_at_the_center() {
        let request = GridRequest::new(10.0, 12.0, 20.0, 22.0).with_resolution(3, 3);
        let response = synthetic_grid(&request);

        assert_eq!(response.cells.len(), 9);
        let center = response.cells[4];
        assert_eq!((center.row, center.col), (1, 1));
        assert!((center.intensity - 1.0).abs() < f64::EPSILON);
        assert!((center.score - 100.0).abs() < f64::EPSILON);
        assert!(
            response
                .cells
                .iter()
                .all(|c| (0.0..=1.0).contains(&c.intensity) && c.intensity <= center.intensity)
        );
        assert!((response.summary.min).abs() < f64::EPSILON);
        assert!((response.summary.max - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn corners_fall_off_with_distance() {
        let request = GridRequest::new(0.0, 2.0, 0.0, 2.0).with_resolution(3, 3);
        let corner = synthetic_grid(&request).cells[0];

        // sqrt(2) / 2 from the center over a span of 2.
        let expected = 1.0 - std::f64::consts::SQRT_2 / 2.0;
        assert!((corner.intensity - expected).abs() < 1e-12);
        assert!((corner.score - expected * 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_extent_box_is_flat() {
        let request = GridRequest::new(10.0, 10.0, 20.0, 20.0).with_resolution(2, 2);
        let response = synthetic_grid(&request);

        assert_eq!(response.cells.len(), 4);
        assert!(response.cells.iter().all(|c| c.intensity == 0.0));
    }
}
