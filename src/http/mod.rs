//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with all catalog and streaming endpoints
//! - JSON catalog handlers (list, search, detail, watch stats, scan)
//! - Range-aware video streaming
//! - Subtitle serving with SRT to WebVTT conversion
//! - CORS middleware

pub mod handlers;
pub mod routes;
pub mod stream;
pub mod subtitles;

pub use routes::create_router;
