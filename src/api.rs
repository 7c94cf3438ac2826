//! HTTP surface for DocDigest.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /api/analyze` – Multipart upload of one or more `files` plus an optional
//!   `summary_type` (`short` | `medium` | `long`, default `short`). Responds with
//!   `{"ok": true, "files": [...]}`, one entry per uploaded file in upload order; each entry is
//!   either a summary bundle or `{name, error}`.
//! - `GET /api/health` – Liveness probe.
//! - `GET /api/metrics` – Analysis counters since startup.
//!
//! Only request-shape problems (no files, malformed multipart body) produce a non-200 status.

use crate::metrics::MetricsSnapshot;
use crate::pipeline::{AnalysisApi, Document, FileOutcome, SummaryType};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

const FILES_FIELD: &str = "files";
const SUMMARY_TYPE_FIELD: &str = "summary_type";
const DEFAULT_UPLOAD_NAME: &str = "upload";

/// Build the HTTP router exposing the analysis API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: AnalysisApi + 'static,
{
    Router::new()
        .route("/api/analyze", post(analyze_documents::<S>))
        .route("/api/health", get(health))
        .route("/api/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// CORS policy for the API routes: a single allowed origin, or any origin when unset.
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any),
        Err(error) => {
            tracing::warn!(origin, error = %error, "Invalid CORS origin; cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

/// Success response for `POST /api/analyze`.
#[derive(Serialize)]
struct AnalyzeResponse {
    ok: bool,
    files: Vec<FileOutcome>,
}

/// Analyze every uploaded file.
///
/// Fields may arrive in any order; all parts are read before processing starts. Unknown
/// fields are ignored and an invalid `summary_type` silently becomes `short`.
async fn analyze_documents<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError>
where
    S: AnalysisApi,
{
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected non-multipart analyze request");
        ApiError::BadRequest("No files provided".into())
    })?;

    let mut documents = Vec::new();
    let mut summary_type = SummaryType::default();
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(FILES_FIELD) => {
                let name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_NAME)
                    .to_string();
                let bytes = field.bytes().await?;
                documents.push(Document::new(name, bytes.to_vec()));
            }
            Some(SUMMARY_TYPE_FIELD) => {
                summary_type = SummaryType::parse_or_default(&field.text().await?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unexpected multipart field");
            }
        }
    }

    if documents.is_empty() {
        return Err(ApiError::BadRequest("No files provided".into()));
    }

    let span = tracing::info_span!(
        "analyze",
        request_id = %Uuid::new_v4(),
        files = documents.len(),
        summary_type = summary_type.as_str()
    );
    let files = service
        .analyze_documents(documents, summary_type)
        .instrument(span.clone())
        .await;
    let failed = files
        .iter()
        .filter(|outcome| matches!(outcome, FileOutcome::Failed(_)))
        .count();
    span.in_scope(|| tracing::info!(failed, "Analyze request completed"));

    Ok(Json(AnalyzeResponse { ok: true, files }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "status": "healthy" }))
}

/// Response body for `GET /api/metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    ok: bool,
    #[serde(flatten)]
    metrics: MetricsSnapshot,
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: AnalysisApi,
{
    Json(MetricsResponse {
        ok: true,
        metrics: service.metrics_snapshot(),
    })
}

enum ApiError {
    BadRequest(String),
    Upload(MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Upload(error) => (error.status(), error.body_text()),
        };
        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(inner: MultipartError) -> Self {
        Self::Upload(inner)
    }
}
