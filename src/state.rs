//! Application state
//!
//! Shared state handed to every request handler: the loaded configuration
//! and the catalog store. The catalog is opened by the host at startup and
//! injected here; handlers never open connections themselves.

use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::catalog::CatalogStore;
use crate::config::ServerConfig;

pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Movie catalog store
    pub catalog: CatalogStore,

    /// Held for the duration of a scan. The exists-then-insert sequence in
    /// the scanner is not transactional, so scans must not overlap.
    scan_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: ServerConfig, catalog: CatalogStore) -> Self {
        Self {
            config,
            catalog,
            scan_lock: Mutex::new(()),
        }
    }

    /// Serialize scans: callers hold the guard while scanning.
    pub async fn acquire_scan_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.scan_lock.lock().await
    }

    /// Resolve a catalog-relative file path against the media root.
    pub fn resolve_media_path(&self, relative: &str) -> PathBuf {
        self.config.media_root.join(relative)
    }
}
