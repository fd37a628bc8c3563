//! Movie catalog persistence
//!
//! One record per indexed video file, keyed by the file path relative to the
//! media root. Backed by SQLite; the connection is owned by the host and
//! injected into the components that need it.

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Video resolution inferred from file or folder naming, never from stream
/// inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "1080p")]
    Fhd1080p,
    #[serde(rename = "720p")]
    Hd720p,
    #[serde(rename = "480p")]
    Sd480p,
    Unknown,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Uhd4k => "4K",
            Resolution::Fhd1080p => "1080p",
            Resolution::Hd720p => "720p",
            Resolution::Sd480p => "480p",
            Resolution::Unknown => "Unknown",
        }
    }

    pub fn from_str_or_unknown(s: &str) -> Self {
        match s {
            "4K" => Resolution::Uhd4k,
            "1080p" => Resolution::Fhd1080p,
            "720p" => Resolution::Hd720p,
            "480p" => Resolution::Sd480p,
            _ => Resolution::Unknown,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully persisted catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    /// Path relative to the media root; unique natural key.
    pub file_path: String,
    pub file_size: i64,
    pub resolution: Resolution,
    pub format: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub subtitles: Vec<String>,
    pub added_date: String,
    pub last_watched: Option<String>,
    pub watch_count: i64,
}

/// A record as produced by the scanner, before the store assigns an id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub file_path: String,
    pub file_size: i64,
    pub resolution: Resolution,
    pub format: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub subtitles: Vec<String>,
}

/// SQLite-backed catalog store.
///
/// The connection is guarded by a mutex so the store can be shared between
/// the HTTP handlers and a scan running on the blocking pool. All statements
/// are short-lived point queries.
pub struct CatalogStore {
    conn: Mutex<Connection>,
}

const CREATE_MOVIES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        file_path TEXT UNIQUE NOT NULL,
        file_size INTEGER,
        resolution TEXT,
        format TEXT,
        year INTEGER,
        description TEXT,
        subtitles TEXT,
        added_date DATETIME DEFAULT CURRENT_TIMESTAMP,
        last_watched DATETIME,
        watch_count INTEGER DEFAULT 0
    )
";

impl CatalogStore {
    /// Open (or create) the catalog at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Open an in-memory catalog. Used by tests and ad-hoc tooling.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_MOVIES_TABLE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Check whether a relative path is already cataloged.
    pub fn exists(&self, file_path: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM movies WHERE file_path = ?1",
                [file_path],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.is_some())
    }

    /// Insert a record, replacing any existing row with the same path.
    /// Returns the assigned id.
    pub fn insert(&self, movie: &NewMovie) -> Result<i64> {
        let subtitles_json = if movie.subtitles.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&movie.subtitles).unwrap_or_default())
        };

        let conn = self.conn.lock();
        let id = conn.query_row(
            "INSERT OR REPLACE INTO movies
                (title, file_path, file_size, resolution, format, year, description, subtitles)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
            rusqlite::params![
                movie.title,
                movie.file_path,
                movie.file_size,
                movie.resolution.as_str(),
                movie.format,
                movie.year,
                movie.description,
                subtitles_json,
            ],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    /// Look up a single record by id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<MovieRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row("SELECT * FROM movies WHERE id = ?1", [id], row_to_record)
            .optional()?;
        Ok(record)
    }

    /// All records, newest first.
    pub fn all(&self) -> Result<Vec<MovieRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM movies ORDER BY added_date DESC, id DESC")?;
        let rows = stmt.query_map([], row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Substring search over title and description, newest first.
    pub fn search(&self, query: &str) -> Result<Vec<MovieRecord>> {
        let term = format!("%{}%", query);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT * FROM movies
             WHERE title LIKE ?1 OR description LIKE ?1
             ORDER BY added_date DESC, id DESC",
        )?;
        let rows = stmt.query_map([&term], row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Record a watch event: bump the counter and stamp last_watched.
    /// Returns the number of affected rows (0 when the id does not exist).
    pub fn update_watch_stats(&self, id: i64) -> Result<usize> {
        let conn = self.conn.lock();
        let changes = conn.execute(
            "UPDATE movies
             SET last_watched = CURRENT_TIMESTAMP, watch_count = watch_count + 1
             WHERE id = ?1",
            [id],
        )?;
        Ok(changes)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovieRecord> {
    let resolution: Option<String> = row.get("resolution")?;
    let subtitles_json: Option<String> = row.get("subtitles")?;
    let subtitles = subtitles_json
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    Ok(MovieRecord {
        id: row.get("id")?,
        title: row.get("title")?,
        file_path: row.get("file_path")?,
        file_size: row.get::<_, Option<i64>>("file_size")?.unwrap_or(0),
        resolution: Resolution::from_str_or_unknown(resolution.as_deref().unwrap_or("Unknown")),
        format: row.get::<_, Option<String>>("format")?.unwrap_or_default(),
        year: row.get("year")?,
        description: row.get("description")?,
        subtitles,
        added_date: row.get("added_date")?,
        last_watched: row.get("last_watched")?,
        watch_count: row.get::<_, Option<i64>>("watch_count")?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_movie(path: &str) -> NewMovie {
        NewMovie {
            title: "Test Movie".to_string(),
            file_path: path.to_string(),
            file_size: 1024,
            resolution: Resolution::Fhd1080p,
            format: "MP4".to_string(),
            year: Some(2020),
            description: None,
            subtitles: vec!["movie.en.srt".to_string()],
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = CatalogStore::open_in_memory().unwrap();
        let id = store.insert(&sample_movie("a/b.mp4")).unwrap();

        let record = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.title, "Test Movie");
        assert_eq!(record.file_path, "a/b.mp4");
        assert_eq!(record.resolution, Resolution::Fhd1080p);
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.subtitles, vec!["movie.en.srt".to_string()]);
        assert_eq!(record.watch_count, 0);
        assert!(record.last_watched.is_none());
        assert!(!record.added_date.is_empty());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert!(store.get_by_id(42).unwrap().is_none());
    }

    #[test]
    fn test_exists() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert!(!store.exists("a/b.mp4").unwrap());
        store.insert(&sample_movie("a/b.mp4")).unwrap();
        assert!(store.exists("a/b.mp4").unwrap());
        assert!(!store.exists("other.mp4").unwrap());
    }

    #[test]
    fn test_path_uniqueness_replaces() {
        let store = CatalogStore::open_in_memory().unwrap();
        store.insert(&sample_movie("a/b.mp4")).unwrap();
        store.insert(&sample_movie("a/b.mp4")).unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_subtitles_stored_as_null() {
        let store = CatalogStore::open_in_memory().unwrap();
        let movie = NewMovie {
            subtitles: Vec::new(),
            ..sample_movie("loose.mkv")
        };
        let id = store.insert(&movie).unwrap();
        let record = store.get_by_id(id).unwrap().unwrap();
        assert!(record.subtitles.is_empty());
    }

    #[test]
    fn test_search_matches_title_and_description() {
        let store = CatalogStore::open_in_memory().unwrap();
        store.insert(&sample_movie("one.mp4")).unwrap();
        let mut other = sample_movie("two.mp4");
        other.title = "Something Else".to_string();
        other.description = Some("Subtitles available: two.srt".to_string());
        store.insert(&other).unwrap();

        assert_eq!(store.search("Test").unwrap().len(), 1);
        assert_eq!(store.search("available").unwrap().len(), 1);
        assert_eq!(store.search("nope").unwrap().len(), 0);
    }

    #[test]
    fn test_update_watch_stats() {
        let store = CatalogStore::open_in_memory().unwrap();
        let id = store.insert(&sample_movie("a/b.mp4")).unwrap();

        assert_eq!(store.update_watch_stats(id).unwrap(), 1);
        let record = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(record.watch_count, 1);
        assert!(record.last_watched.is_some());

        assert_eq!(store.update_watch_stats(id).unwrap(), 1);
        assert_eq!(store.get_by_id(id).unwrap().unwrap().watch_count, 2);
    }

    #[test]
    fn test_update_watch_stats_missing_id() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert_eq!(store.update_watch_stats(999).unwrap(), 0);
    }

    #[test]
    fn test_resolution_roundtrip() {
        for res in ["4K", "1080p", "720p", "480p", "Unknown"] {
            assert_eq!(Resolution::from_str_or_unknown(res).as_str(), res);
        }
        assert_eq!(
            Resolution::from_str_or_unknown("garbage"),
            Resolution::Unknown
        );
    }
}
