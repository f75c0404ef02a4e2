//! Print Service
//!
//! Accepts badge print requests, composes badges on a background task and
//! tracks each job's progress for polling clients.

pub mod config;
pub mod handlers;
pub mod models;
pub mod printer;
pub mod registry;
pub mod worker;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use handlers::AppState;
pub use models::{PhotoPayload, StartPrintRequest, StartPrintResponse, StatusQuery};
pub use printer::{NoopPrinter, Printer};
pub use registry::{JobRegistry, JobStats};
pub use worker::{JobOutcome, PipelineError, PrintPipeline, StageDelays, StartedJob};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let badges = ServeDir::new(&state.output_dir);
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/stats", get(handlers::get_stats_handler))
        .route("/api/print", post(handlers::start_print_handler))
        .route("/api/status", get(handlers::job_status_handler))
        .route("/api/status/{job_id}", get(handlers::job_status_by_id_handler))
        .nest_service("/badges", badges)
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
