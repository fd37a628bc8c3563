//! Companion subtitle matching
//!
//! Given the directory a video lives in, finds subtitle files that belong to
//! it. Matching is by name containment in either direction, with a fallback
//! for generically named files like `subs.srt`.

use std::path::Path;

/// Recognized subtitle file extensions (lowercase, without dot).
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt", "ass", "ssa", "sub", "idx", "sup"];

/// Find subtitle files in `directory` associated with a video whose base name
/// (without extension) is `video_base`.
///
/// Non-recursive. The result is sorted lexically so repeated scans produce
/// identical records. An unreadable directory yields an empty list rather
/// than an error; the caller keeps scanning.
pub fn find_subtitles(directory: &Path, video_base: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {} for subtitles: {}", directory.display(), e);
            return Vec::new();
        }
    };

    let mut subtitles = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let path = Path::new(name);

        let is_subtitle = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUBTITLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !is_subtitle {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if matches_video(stem, video_base) {
            subtitles.push(name.to_string());
        }
    }

    subtitles.sort();
    subtitles
}

/// Inclusive-OR association rule: containment in either direction, or a
/// generic `sub`/`subtitle` marker in the candidate's name.
fn matches_video(subtitle_stem: &str, video_base: &str) -> bool {
    let stem_lower = subtitle_stem.to_lowercase();
    subtitle_stem.contains(video_base)
        || video_base.contains(subtitle_stem)
        || stem_lower.contains("subtitle")
        || stem_lower.contains("sub")
}
