//! Library scanner - walks the media root and fills the catalog
//!
//! Discovery is additive only: files whose relative path is already cataloged
//! are skipped without refreshing their metadata, so a rescan of an unchanged
//! tree is a no-op.

use serde::Serialize;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::catalog::{CatalogStore, NewMovie};
use crate::error::{Result, ServerError};
use crate::index::metadata::extract_metadata;
use crate::index::subtitles::find_subtitles;

/// Recognized video file extensions (lowercase, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v"];

/// Directory names never descended into, compared case-insensitively.
const EXCLUDED_DIRS: &[&str] = &["thumbnails", "temp", "cache"];

/// Outcome of a scan. `found` counts every video file seen, including ones
/// already cataloged; `added` counts new records only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScanReport {
    pub found: usize,
    pub added: usize,
}

/// Recursively scan `root` and insert newly discovered videos into the
/// catalog.
///
/// Per-file failures (stat errors, unreadable subdirectories, insert
/// failures) are logged and skipped; only a failure to enumerate the root
/// itself is fatal.
pub fn scan_library(root: &Path, catalog: &CatalogStore) -> Result<ScanReport> {
    // The walk below degrades per-entry errors to warnings, so probe the root
    // up front to give the fatal case a real error.
    std::fs::read_dir(root)
        .map_err(|e| ServerError::Scan(format!("cannot read media root {}: {}", root.display(), e)))?;

    tracing::info!("Starting media scan in {}", root.display());

    let mut found = 0usize;
    let mut added = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot access entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_video(entry.path()) {
            continue;
        }

        found += 1;
        match process_file(root, entry.path(), catalog) {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Error processing {}: {}", entry.path().display(), e);
            }
        }
    }

    tracing::info!("Scan completed. Found: {}, Added: {}", found, added);
    Ok(ScanReport { found, added })
}

/// Index a single video file. Returns Ok(true) when a new record was
/// inserted, Ok(false) when the path was already cataloged.
fn process_file(root: &Path, path: &Path, catalog: &CatalogStore) -> Result<bool> {
    let relative_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    if catalog.exists(&relative_path)? {
        return Ok(false);
    }

    let file_stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let file_dir = path.parent().unwrap_or(root);

    // Folder-per-movie layout: when the file sits in its own subdirectory the
    // folder name is the better title source than the file name.
    let in_movie_folder = file_dir != root;
    let raw_title = if in_movie_folder {
        file_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(file_stem.as_str())
    } else {
        file_stem.as_str()
    };

    let meta = extract_metadata(raw_title);
    let title = if meta.title.is_empty() {
        file_stem.clone()
    } else {
        meta.title
    };

    let file_size = std::fs::metadata(path)?.len() as i64;
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_uppercase();

    let subtitles = find_subtitles(file_dir, &file_stem);
    let description = if subtitles.is_empty() {
        None
    } else if in_movie_folder {
        Some(format!(
            "Movie with {} subtitle file(s): {}",
            subtitles.len(),
            subtitles.join(", ")
        ))
    } else {
        Some(format!("Subtitles available: {}", subtitles.join(", ")))
    };

    let movie = NewMovie {
        title,
        file_path: relative_path,
        file_size,
        resolution: meta.resolution,
        format,
        year: meta.year,
        description,
        subtitles,
    };
    catalog.insert(&movie)?;
    tracing::debug!("Added: {}", movie.title);
    Ok(true)
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Hidden directories and common non-media directories are pruned, not
/// descended into.
fn is_excluded_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| {
            name.starts_with('.') || EXCLUDED_DIRS.contains(&name.to_lowercase().as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Resolution;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture_library() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();

        write_file(&root.join("Loose.Movie.720p.mp4"), b"loose");
        write_file(
            &root.join("The Secret Dare To Dream (2020) [1080p]/movie.mkv"),
            b"foldered",
        );
        write_file(
            &root.join("The Secret Dare To Dream (2020) [1080p]/movie.en.srt"),
            b"1\n00:00:01,000 --> 00:00:04,000\nhi\n",
        );
        write_file(
            &root.join("The Secret Dare To Dream (2020) [1080p]/movie.nfo"),
            b"ignored",
        );
        write_file(&root.join(".hidden/secret.mp4"), b"hidden");
        write_file(&root.join("Thumbnails/preview.mp4"), b"thumb");
        write_file(&root.join("notes.txt"), b"not a video");
        dir
    }

    #[test]
    fn test_scan_discovers_and_prunes() {
        let dir = fixture_library();
        let catalog = CatalogStore::open_in_memory().unwrap();

        let report = scan_library(dir.path(), &catalog).unwrap();
        assert_eq!(report.found, 2);
        assert_eq!(report.added, 2);

        let movies = catalog.all().unwrap();
        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| !m.file_path.contains(".hidden")));
    }

    #[test]
    fn test_foldered_movie_metadata() {
        let dir = fixture_library();
        let catalog = CatalogStore::open_in_memory().unwrap();
        scan_library(dir.path(), &catalog).unwrap();

        let movies = catalog.all().unwrap();
        let foldered = movies
            .iter()
            .find(|m| m.file_path.ends_with("movie.mkv"))
            .unwrap();
        assert_eq!(foldered.title, "The Secret Dare To Dream");
        assert_eq!(foldered.year, Some(2020));
        assert_eq!(foldered.resolution, Resolution::Fhd1080p);
        assert_eq!(foldered.format, "MKV");
        assert_eq!(foldered.file_size, "foldered".len() as i64);
        assert_eq!(foldered.subtitles, vec!["movie.en.srt".to_string()]);
        assert_eq!(
            foldered.description.as_deref(),
            Some("Movie with 1 subtitle file(s): movie.en.srt")
        );
    }

    #[test]
    fn test_loose_movie_metadata() {
        let dir = fixture_library();
        let catalog = CatalogStore::open_in_memory().unwrap();
        scan_library(dir.path(), &catalog).unwrap();

        let movies = catalog.all().unwrap();
        let loose = movies
            .iter()
            .find(|m| m.file_path == "Loose.Movie.720p.mp4")
            .unwrap();
        assert_eq!(loose.title, "Loose Movie");
        assert_eq!(loose.resolution, Resolution::Hd720p);
        assert_eq!(loose.format, "MP4");
        assert_eq!(loose.year, None);
        assert!(loose.subtitles.is_empty());
        assert!(loose.description.is_none());
    }

    #[test]
    fn test_loose_movie_with_root_subtitle() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("film.mp4"), b"x");
        write_file(&dir.path().join("film.srt"), b"x");

        let catalog = CatalogStore::open_in_memory().unwrap();
        scan_library(dir.path(), &catalog).unwrap();

        let movie = &catalog.all().unwrap()[0];
        assert_eq!(
            movie.description.as_deref(),
            Some("Subtitles available: film.srt")
        );
    }

    #[test]
    fn test_rescan_is_noop() {
        let dir = fixture_library();
        let catalog = CatalogStore::open_in_memory().unwrap();

        let first = scan_library(dir.path(), &catalog).unwrap();
        let second = scan_library(dir.path(), &catalog).unwrap();

        assert_eq!(first.found, second.found);
        assert_eq!(second.added, 0);
        assert_eq!(catalog.all().unwrap().len(), first.added);
    }

    #[test]
    fn test_rescan_does_not_refresh_metadata() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("film.mp4"), b"v1");

        let catalog = CatalogStore::open_in_memory().unwrap();
        scan_library(dir.path(), &catalog).unwrap();

        // Grow the file; the catalog keeps the stale size by design.
        write_file(&dir.path().join("film.mp4"), b"v1 plus more bytes");
        scan_library(dir.path(), &catalog).unwrap();

        let movie = &catalog.all().unwrap()[0];
        assert_eq!(movie.file_size, 2);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let catalog = CatalogStore::open_in_memory().unwrap();
        let result = scan_library(Path::new("/no/such/media/root"), &catalog);
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_directories_descended() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("series/season 1/episode.one.mp4"), b"x");

        let catalog = CatalogStore::open_in_memory().unwrap();
        let report = scan_library(dir.path(), &catalog).unwrap();
        assert_eq!(report.added, 1);

        let movie = &catalog.all().unwrap()[0];
        // Parent directory names the title in folder-per-movie layout.
        assert_eq!(movie.title, "season 1");
    }
}
