//! Range-aware video streaming
//!
//! Serves catalog entries as raw file bytes with HTTP range support so
//! browsers can seek. Bodies are streamed from disk (open, seek, bounded
//! read); the whole file is never buffered in memory. Once response headers
//! are committed a read error can only terminate the connection.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::state::AppState;

use super::handlers::{AppStateExt, HttpError};

/// Content type for a video file by extension. Unknown extensions default to
/// `video/mp4`.
pub fn video_content_type(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "m4v" => "video/x-m4v",
        _ => "video/mp4",
    }
}

/// Parse a `Range` header value into an inclusive byte span.
///
/// Deliberately a subset of RFC 7233: the `bytes=` prefix is required, the
/// start position is required, and only the first comma-separated clause is
/// honored. The end position defaults to (and is clamped to) the last byte.
pub fn parse_range(value: &str, file_size: u64) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let first = spec.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;

    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = match end.trim() {
        "" => file_size.saturating_sub(1),
        e => e.parse::<u64>().ok()?.min(file_size.saturating_sub(1)),
    };

    if start > end || start >= file_size {
        return None;
    }
    Some((start, end))
}

fn cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range"),
    );
}

/// Stream a movie, honoring an optional Range header
/// GET /api/stream/{id}
pub async fn stream_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    req_headers: HeaderMap,
) -> Result<Response, HttpError> {
    let movie = state.get_movie_or_error(id)?;
    let video_path = state.resolve_media_path(&movie.file_path);

    // The catalog entry can outlive the file on disk; a stale record is a 404,
    // not a server error.
    let file_size = match tokio::fs::metadata(&video_path).await {
        Ok(meta) => meta.len(),
        Err(_) => return Err(HttpError::NotFound("Video file not found".to_string())),
    };

    let content_type = video_content_type(&video_path);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    cors_headers(&mut headers);

    if let Some(range_value) = req_headers.get(header::RANGE) {
        let range_str = range_value
            .to_str()
            .map_err(|_| HttpError::BadRequest("Invalid Range header".to_string()))?;

        let Some((start, end)) = parse_range(range_str, file_size) else {
            return Ok(range_not_satisfiable(file_size));
        };
        let chunk_size = end - start + 1;

        let mut file = tokio::fs::File::open(&video_path)
            .await
            .map_err(|e| HttpError::InternalError(format!("Failed to open video: {}", e)))?;
        file.seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(|e| HttpError::InternalError(format!("Failed to seek video: {}", e)))?;

        headers.insert(
            header::CONTENT_RANGE,
            HeaderValue::from_str(&format!("bytes {}-{}/{}", start, end, file_size))
                .map_err(|e| HttpError::InternalError(e.to_string()))?,
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(chunk_size));
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("Content-Range, Content-Length"),
        );

        let body = Body::from_stream(ReaderStream::new(file.take(chunk_size)));
        return Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response());
    }

    // No range: serve the entire file as a 200.
    let file = tokio::fs::File::open(&video_path)
        .await
        .map_err(|e| HttpError::InternalError(format!("Failed to open video: {}", e)))?;

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file_size));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Length, Accept-Ranges"),
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((StatusCode::OK, headers, body).into_response())
}

fn range_not_satisfiable(file_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{}", file_size))],
    )
        .into_response()
}
