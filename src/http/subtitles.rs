//! Subtitle serving
//!
//! Serves subtitle files that were associated with a movie at scan time.
//! The requested filename must appear in the movie's stored subtitle list;
//! that containment check against trusted catalog data is the path-traversal
//! defense, so no filesystem lookups happen for unlisted names.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::AppState;
use crate::subtitle::{convert_srt_to_vtt, is_srt, subtitle_content_type};

use super::handlers::{AppStateExt, HttpError};

/// Serve a subtitle file, converting SRT to WebVTT
/// GET /api/subtitles/{id}/{filename}
pub async fn serve_subtitle(
    State(state): State<Arc<AppState>>,
    Path((id, filename)): Path<(i64, String)>,
) -> Result<Response, HttpError> {
    let movie = state.get_movie_or_error(id)?;

    if !movie.subtitles.contains(&filename) {
        return Err(HttpError::NotFound(
            "Subtitle file not found in movie data".to_string(),
        ));
    }

    // Subtitles live next to the video file, not at the media root.
    let video_dir = std::path::Path::new(&movie.file_path)
        .parent()
        .unwrap_or_else(|| std::path::Path::new(""));
    let subtitle_path = state
        .config
        .media_root
        .join(video_dir)
        .join(&filename);

    if tokio::fs::metadata(&subtitle_path).await.is_err() {
        return Err(HttpError::NotFound(
            "Subtitle file not found on disk".to_string(),
        ));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range"),
    );

    if is_srt(&filename) {
        // Convert to WebVTT; on a read/decode failure fall back to the raw
        // bytes under the original content type.
        match tokio::fs::read_to_string(&subtitle_path).await {
            Ok(srt) => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/vtt"));
                return Ok((StatusCode::OK, headers, convert_srt_to_vtt(&srt)).into_response());
            }
            Err(e) => {
                tracing::warn!(
                    "SRT conversion failed for {}, serving raw: {}",
                    subtitle_path.display(),
                    e
                );
            }
        }
    }

    let bytes = tokio::fs::read(&subtitle_path)
        .await
        .map_err(|e| HttpError::InternalError(format!("Failed to read subtitle: {}", e)))?;

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(subtitle_content_type(&filename)),
    );
    Ok((StatusCode::OK, headers, bytes).into_response())
}
