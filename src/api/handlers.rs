//! API request handlers shared by every document type

use crate::models::Document;
use crate::things::Things;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Shared server state
pub struct ServerState {
    pub things: Things,
    /// Directory of the built frontend, served with an SPA fallback
    pub frontend_path: Option<String>,
}

pub type SharedState = Arc<ServerState>;

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// Returns 200 + `"ok"` when the document store answers, 503 + `"unhealthy"`
/// otherwise.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let store_ok = state.things.health_check().await.unwrap_or(false);

    let (http_status, status) = if store_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: if store_ok {
                "connected".to_string()
            } else {
                "disconnected".to_string()
            },
        }),
    )
}

// ============================================================================
// Generic document CRUD
// ============================================================================

pub async fn list_documents<T: Document>(
    State(state): State<SharedState>,
) -> Result<Json<Vec<T>>, AppError> {
    Ok(Json(state.things.collection::<T>().all().await?))
}

pub async fn get_document<T: Document>(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<T>, AppError> {
    state
        .things
        .collection::<T>()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>(id))
}

pub async fn create_document<T: Document>(
    State(state): State<SharedState>,
    Json(req): Json<T::Create>,
) -> Result<(StatusCode, Json<T>), AppError> {
    let doc = state.things.collection::<T>().create(req).await?;
    debug!(collection = T::COLLECTION, id = %doc.id(), "Created document");
    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn update_document<T: Document>(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<T::Patch>,
) -> Result<Json<T>, AppError> {
    state
        .things
        .collection::<T>()
        .update(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>(id))
}

pub async fn delete_document<T: Document>(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.things.collection::<T>().delete(id).await? {
        debug!(collection = T::COLLECTION, id = %id, "Deleted document");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<T>(id))
    }
}

pub(crate) fn not_found<T: Document>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", T::ROUTE, id))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
