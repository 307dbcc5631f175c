#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web demand prediction server for `FoodLink`.
//!
//! Resolves the demand model once at startup (loading the persisted
//! artifact or training a new one) and serves grid predictions for the
//! map frontend. The model is handed to every handler through
//! [`AppState`]; there is no global model.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use foodlink_model::{DemandModel, LoadOutcome, ModelLoader};

/// Shared application state.
pub struct AppState {
    /// The process-wide demand model, read-only after startup.
    pub model: Arc<dyn DemandModel>,
}

impl AppState {
    /// Wraps a ready model for sharing across workers.
    pub fn new(model: impl DemandModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

/// Registers every route on `cfg`.
///
/// Malformed JSON bodies and query strings are rejected with the same
/// `400 {"error": ...}` body as requests that fail validation.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, req| handlers::extractor_error(err, req)),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, req| handlers::extractor_error(err, req)),
    )
    .route("/predict_grid", web::post().to(handlers::predict_grid))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/heatmap", web::get().to(handlers::heatmap)),
        );
}

/// Resolves the demand model and builds the application state.
///
/// # Errors
///
/// Returns an error if an existing model artifact cannot be decoded or a
/// new model cannot be trained and persisted. Startup must not continue
/// in either case.
pub fn bootstrap(loader: ModelLoader) -> std::io::Result<AppState> {
    let path = loader.artifact_path().to_path_buf();
    let (model, outcome) = loader.initialize().map_err(|e| {
        log::error!("Failed to initialize demand model at {}: {e}", path.display());
        std::io::Error::other(e)
    })?;

    match outcome {
        LoadOutcome::Loaded => log::info!("Demand model loaded"),
        LoadOutcome::Trained => log::info!("Demand model trained"),
    }

    Ok(AppState::new(model))
}

/// Starts the demand API server.
///
/// Initializes logging, resolves the model from the default artifact
/// path, and starts the Actix-Web HTTP server. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if model initialization fails, or if the HTTP server
/// fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let state = web::Data::new(bootstrap(ModelLoader::default())?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8001);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
