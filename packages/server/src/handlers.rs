//! HTTP handler functions for the demand API.

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, error::InternalError, web};
use foodlink_grid::{GridError, score_grid, synthetic_grid};
use foodlink_grid_models::{GridRequest, GridResponse};
use foodlink_server_models::{ApiHealth, HeatmapQueryParams, HeatmapResponse, ScoreSource};

use crate::AppState;

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

/// Turns an extractor rejection into the same `400 {"error": ...}` body
/// the handlers return for invalid requests.
pub fn extractor_error(err: impl std::fmt::Display, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    let response = bad_request(&message);
    InternalError::from_response(message, response).into()
}

/// Scores `request` on the blocking thread pool.
///
/// A large lattice takes long enough to stall every connection on the
/// calling worker, so inference never runs on the async executor.
async fn score_blocking(
    state: &AppState,
    request: GridRequest,
) -> Result<Result<GridResponse, GridError>, actix_web::error::BlockingError> {
    let model = Arc::clone(&state.model);
    web::block(move || score_grid(model.as_ref(), &request)).await
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /predict_grid`
///
/// Scores a bounding-box lattice with the demand model.
pub async fn predict_grid(
    state: web::Data<AppState>,
    body: web::Json<GridRequest>,
) -> HttpResponse {
    match score_blocking(&state, body.into_inner()).await {
        Ok(Ok(response)) => HttpResponse::Ok().json(response),
        Ok(Err(GridError::InvalidRequest { message })) => bad_request(&message),
        Ok(Err(e)) => {
            log::error!("Failed to score grid: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to score grid"
            }))
        }
        Err(e) => {
            log::error!("Grid scoring task did not complete: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to score grid"
            }))
        }
    }
}

/// `GET /api/heatmap`
///
/// Returns a map heat layer for the requested box. Falls back to a
/// synthetic grid when the model cannot score it.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    let request = GridRequest::from(params.into_inner());

    let failure = match score_blocking(&state, request.clone()).await {
        Ok(Ok(response)) => {
            return HttpResponse::Ok()
                .json(HeatmapResponse::new(response.cells, ScoreSource::Ml));
        }
        Ok(Err(GridError::InvalidRequest { message })) => return bad_request(&message),
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };

    log::warn!("Demand model failed, falling back to synthetic grid: {failure}");
    let fallback = synthetic_grid(&request);
    HttpResponse::Ok().json(HeatmapResponse::new(
        fallback.cells,
        ScoreSource::Synthetic,
    ))
}
