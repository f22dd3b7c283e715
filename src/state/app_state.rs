use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use snapshot_reader::{LookupTables, Snapshot};

#[derive(Clone)]
pub struct AppState {
    // Maps snapshot id -> loaded snapshot
    pub snapshots: Arc<RwLock<HashMap<String, Arc<RwLock<Snapshot>>>>>,
    // Source files currently being ingested
    loading: Arc<Mutex<HashSet<PathBuf>>>,
    pub tables: Arc<LookupTables>,
}

/// Held while a file is ingested; releases the path on drop.
pub struct LoadGuard {
    loading: Arc<Mutex<HashSet<PathBuf>>>,
    path: PathBuf,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.loading.lock() {
            set.remove(&self.path);
        }
    }
}

impl AppState {
    pub fn new(tables: LookupTables) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            loading: Arc::new(Mutex::new(HashSet::new())),
            tables: Arc::new(tables),
        }
    }

    /// None when the same file is already being loaded.
    pub fn begin_load(&self, path: &Path) -> Option<LoadGuard> {
        let mut set = self.loading.lock().ok()?;
        if !set.insert(path.to_path_buf()) {
            return None;
        }
        Some(LoadGuard {
            loading: self.loading.clone(),
            path: path.to_path_buf(),
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LookupTables::default())
    }
}
