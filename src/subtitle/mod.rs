//! Subtitle format handling
//!
//! Browsers only take WebVTT in `<track>` elements, so SRT files are
//! converted on the fly when served: a `WEBVTT` header is prepended and the
//! SRT sub-second separator (comma) becomes a period. Cue text and numbering
//! pass through untouched.

use regex::Regex;
use std::sync::LazyLock;

static SRT_TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2}),(\d{3})").expect("valid regex"));

/// Convert SRT text to WebVTT.
///
/// Replaces every `HH:MM:SS,mmm` timestamp with `HH:MM:SS.mmm` and
/// normalizes CRLF/CR line endings to `\n`.
pub fn convert_srt_to_vtt(srt: &str) -> String {
    let converted = SRT_TIMESTAMP_RE.replace_all(srt, "$1.$2");
    let normalized = converted.replace("\r\n", "\n").replace('\r', "\n");
    format!("WEBVTT\n\n{}", normalized)
}

/// Content type for a subtitle file by extension (lowercase comparison).
/// `.srt` reports `text/srt`; the serving layer switches to `text/vtt` after
/// a successful conversion.
pub fn subtitle_content_type(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "srt" => "text/srt",
        "vtt" => "text/vtt",
        "ass" | "ssa" => "text/x-ssa",
        _ => "text/plain",
    }
}

/// True when the filename is an SRT file needing conversion.
pub fn is_srt(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("srt"))
        .unwrap_or(false)
}
