//! HTTP request handlers
//!
//! Implements the JSON catalog endpoints plus scan and server info.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::catalog::MovieRecord;
use crate::error::ServerError;
use crate::index::scan_library;
use crate::state::AppState;

/// HTTP error type. All error responses carry a JSON `{"error": ...}` body.
#[derive(Debug)]
pub enum HttpError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ServerError> for HttpError {
    fn from(err: ServerError) -> Self {
        // Not-found cases are decided at the handler level where the lookup
        // happens; anything escaping as a ServerError is a real failure.
        HttpError::InternalError(err.to_string())
    }
}

/// Extension trait for AppState
pub trait AppStateExt {
    fn get_movie_or_error(&self, id: i64) -> Result<MovieRecord, HttpError>;
}

impl AppStateExt for AppState {
    fn get_movie_or_error(&self, id: i64) -> Result<MovieRecord, HttpError> {
        self.catalog
            .get_by_id(id)?
            .ok_or_else(|| HttpError::NotFound("Movie not found".to_string()))
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("reel-server v", env!("CARGO_PKG_VERSION"))
}

/// Full catalog listing, newest first
/// GET /api/movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MovieRecord>>, HttpError> {
    let movies = state.catalog.all()?;
    Ok(Json(movies))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Text search over titles and descriptions
/// GET /api/movies/search?q=...
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MovieRecord>>, HttpError> {
    let movies = state.catalog.search(query.q.as_deref().unwrap_or(""))?;
    Ok(Json(movies))
}

/// Single movie detail
/// GET /api/movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MovieRecord>, HttpError> {
    let movie = state.get_movie_or_error(id)?;
    Ok(Json(movie))
}

/// Record a watch event
/// POST /api/movies/{id}/watch
///
/// The id arrives as a string so a non-numeric value maps to 400 rather than
/// a generic routing rejection.
pub async fn record_watch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let id: i64 = id
        .parse()
        .map_err(|_| HttpError::BadRequest("Invalid movie ID".to_string()))?;

    state.get_movie_or_error(id)?;
    state.catalog.update_watch_stats(id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Watch stats updated"
    })))
}

/// Trigger a media scan
/// POST /api/scan
///
/// Scans are serialized: a second request queues behind the running one.
/// The walk itself is blocking filesystem work, so it runs on the blocking
/// thread pool.
pub async fn scan_media(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let _guard = state.acquire_scan_lock().await;

    let scan_state = state.clone();
    let report = tokio::task::spawn_blocking(move || {
        scan_library(&scan_state.config.media_root, &scan_state.catalog)
    })
    .await
    .map_err(|e| HttpError::InternalError(e.to_string()))?
    .map_err(|e| HttpError::InternalError(format!("Failed to scan media: {}", e)))?;

    Ok(Json(serde_json::json!({
        "message": "Media scan completed",
        "found": report.found,
        "added": report.added
    })))
}

/// Server information
/// GET /api/info
pub async fn server_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "reel-server",
        "version": env!("CARGO_PKG_VERSION"),
        "media_root": state.config.media_root.to_string_lossy(),
        "server_time": chrono::Utc::now().to_rfc3339(),
    }))
}
