//! Media indexing module
//!
//! This module handles discovery of video files and derivation of catalog
//! metadata:
//! - Filename/folder-name metadata extraction (title, year, resolution)
//! - Companion subtitle file matching
//! - Recursive directory scanning with catalog deduplication

pub mod metadata;
pub mod scanner;
pub mod subtitles;

pub use metadata::extract_metadata;
pub use scanner::{scan_library, ScanReport};
pub use subtitles::find_subtitles;
