//! Live view of the snapshot file
//!
//! The server never writes application state. It re-reads the snapshot file
//! when its modification time changes, so every request sees the latest
//! state and the dashboard cache invalidates on the new fingerprint.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use tracing::{info, warn};

use tally_core::StateStore;

struct Loaded {
    store: Arc<StateStore>,
    modified: Option<SystemTime>,
}

/// Snapshot source shared by all handlers
pub struct SnapshotSource {
    path: Option<PathBuf>,
    loaded: RwLock<Loaded>,
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl SnapshotSource {
    /// Watch a snapshot file, loading it now
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let store = StateStore::load(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            loaded: RwLock::new(Loaded {
                store: Arc::new(store),
                modified: modified(path),
            }),
        })
    }

    /// Serve a fixed in-memory snapshot
    pub fn fixed(store: StateStore) -> Self {
        Self {
            path: None,
            loaded: RwLock::new(Loaded {
                store: Arc::new(store),
                modified: None,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current snapshot, reloading the file if it changed
    ///
    /// A file that fails to parse keeps the previous snapshot in service.
    pub fn current(&self) -> Arc<StateStore> {
        let Some(path) = &self.path else {
            return self.cached();
        };

        let on_disk = modified(path);
        {
            let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
            if loaded.modified == on_disk {
                return Arc::clone(&loaded.store);
            }
        }

        let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        // Another request may have reloaded while we waited for the lock
        if loaded.modified == on_disk {
            return Arc::clone(&loaded.store);
        }

        match StateStore::load(path) {
            Ok(store) => {
                info!(
                    path = %path.display(),
                    fingerprint = %store.fingerprint(),
                    "Snapshot changed, reloaded"
                );
                loaded.store = Arc::new(store);
                loaded.modified = on_disk;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to reload snapshot, keeping previous");
                loaded.modified = on_disk;
            }
        }
        Arc::clone(&loaded.store)
    }

    fn cached(&self) -> Arc<StateStore> {
        let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&loaded.store)
    }
}
