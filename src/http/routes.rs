//! Axum router configuration

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{
    get_movie, health_check, list_movies, record_watch, scan_media, search_movies, server_info,
    version_check,
};
use super::stream::stream_movie;
use super::subtitles::serve_subtitle;

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Build CORS layer
    // Browsers require the Range header to be explicitly allowed for video
    // seeking from a different origin on the local network.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers([
            header::ACCEPT,
            header::RANGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ])
        .max_age(Duration::from_secs(3600));

    let cors_enabled = state.config.cors_enabled;

    // Build router
    let router = Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Catalog
        .route("/api/movies", get(list_movies))
        .route("/api/movies/search", get(search_movies))
        .route("/api/movies/{id}", get(get_movie))
        .route("/api/movies/{id}/watch", post(record_watch))
        // Streaming
        .route("/api/stream/{id}", get(stream_movie))
        .route("/api/subtitles/{id}/{filename}", get(serve_subtitle))
        // Administration
        .route("/api/scan", post(scan_media))
        .route("/api/info", get(server_info))
        // Middleware
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        router.layer(cors)
    } else {
        router
    };

    // State
    router.with_state(state)
}
