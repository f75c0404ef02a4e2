//! API handlers for Print Service

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use badge_composer::PhotoInput;
use badgematic_common::JobSnapshot;
use std::path::{Component, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::{
    models::{PhotoPayload, StartPrintRequest, StartPrintResponse, StatusQuery},
    worker::PrintPipeline,
};

/// Shared application state
pub struct AppState {
    pub pipeline: PrintPipeline,
    pub photo_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl AppState {
    /// Create a new application state
    pub fn new(pipeline: PrintPipeline, photo_dir: PathBuf) -> Self {
        let output_dir = pipeline.composer().config().output_dir.clone();
        Self {
            pipeline,
            photo_dir,
            output_dir,
        }
    }

    /// Resolve a request photo into composer input
    fn photo_input(&self, photo: PhotoPayload) -> Result<PhotoInput, ApiError> {
        match photo {
            PhotoPayload::DataUrl { data } => Ok(PhotoInput::from_data_url(data)),
            PhotoPayload::File { path } => {
                let relative = PathBuf::from(&path);
                let contained = !path.is_empty()
                    && relative
                        .components()
                        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
                if !contained {
                    return Err(ApiError {
                        status: StatusCode::BAD_REQUEST,
                        message: format!("Invalid photo path: {}", path),
                    });
                }
                Ok(PhotoInput::from_file(self.photo_dir.join(relative)))
            }
        }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<badgematic_common::Error> for ApiError {
    fn from(err: badgematic_common::Error) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

/// Health check
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "print-service"
    }))
}

/// Start a badge print job
pub async fn start_print_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartPrintRequest>,
) -> Result<Json<StartPrintResponse>, ApiError> {
    info!(
        "Print requested for employee: {}",
        payload.identity.employee_label()
    );

    let photo = state.photo_input(payload.photo)?;
    let started = state.pipeline.start_job(payload.identity, photo)?;

    Ok(Json(StartPrintResponse {
        success: true,
        job_id: Some(started.job_id),
        error: None,
    }))
}

/// Poll job status via `?job_id=`
pub async fn job_status_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Json<JobSnapshot> {
    Json(state.pipeline.registry().lookup(query.job_id.as_deref()))
}

/// Poll job status by path
pub async fn job_status_by_id_handler(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Json<JobSnapshot> {
    Json(state.pipeline.registry().lookup(Some(&job_id)))
}

/// Get service stats
pub async fn get_stats_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "print-service",
        "stats": state.pipeline.registry().stats()
    }))
}
