//! Filename metadata extraction
//!
//! Derives a display title, release year, and nominal resolution from a raw
//! file or folder name such as `The.Movie.2019.1080p.BluRay.x264` or
//! `The Secret Dare To Dream (2020) [1080p]`. Purely lexical; the video
//! stream itself is never inspected.

use regex::Regex;
use std::sync::LazyLock;

use crate::catalog::Resolution;

static BRACKET_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static QUALITY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(720p|1080p|4K|2160p)").expect("valid regex"));
static SOURCE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(BluRay|BRRip|DVDRip|WEBRip|HDTV|HDRip)").expect("valid regex"));
static CODEC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(x264|x265|H264|H265)").expect("valid regex"));
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("valid regex"));

static RES_4K_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(4K|2160p)").expect("valid regex"));
static RES_1080P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)1080p").expect("valid regex"));
static RES_720P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)720p").expect("valid regex"));
static RES_480P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)480p").expect("valid regex"));

/// Metadata derived from a raw file or folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Cleaned display title. May be empty when the raw name consisted
    /// entirely of release tags; callers fall back to the file stem.
    pub title: String,
    pub year: Option<i32>,
    pub resolution: Resolution,
}

/// Extract {title, year, resolution} from a raw name.
///
/// Total function: any input yields a result. Year and resolution are matched
/// against the raw (uncleaned) name; the title is the raw name with release
/// tags removed and separators collapsed to single spaces.
pub fn extract_metadata(raw_name: &str) -> ExtractedMetadata {
    let title = BRACKET_TAG_RE.replace_all(raw_name, "");
    let title = QUALITY_TOKEN_RE.replace_all(&title, "");
    let title = SOURCE_TOKEN_RE.replace_all(&title, "");
    let title = CODEC_TOKEN_RE.replace_all(&title, "");
    let title = SEPARATOR_RE.replace_all(&title, " ");
    let title = WHITESPACE_RE.replace_all(&title, " ");
    let mut title = title.trim().to_string();

    // Year is taken from the raw name; the `(YYYY)` token survives cleaning
    // and is stripped from the title separately.
    let year = YEAR_RE
        .captures(raw_name)
        .and_then(|caps| caps[1].parse::<i32>().ok());

    if let Some(year) = year {
        title = title.replace(&format!("({})", year), "");
        title = WHITESPACE_RE.replace_all(&title, " ").trim().to_string();
    }

    ExtractedMetadata {
        title,
        year,
        resolution: detect_resolution(raw_name),
    }
}

/// Priority order 4K/2160p > 1080p > 720p > 480p; first match wins.
fn detect_resolution(raw_name: &str) -> Resolution {
    if RES_4K_RE.is_match(raw_name) {
        Resolution::Uhd4k
    } else if RES_1080P_RE.is_match(raw_name) {
        Resolution::Fhd1080p
    } else if RES_720P_RE.is_match(raw_name) {
        Resolution::Hd720p
    } else if RES_480P_RE.is_match(raw_name) {
        Resolution::Sd480p
    } else {
        Resolution::Unknown
    }
}
