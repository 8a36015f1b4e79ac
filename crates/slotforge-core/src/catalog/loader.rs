use crate::error::{EngineError, EngineResult};
use slotforge_protocol::catalog::CatalogSnapshot;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

/// Supplies catalog snapshots for a college scope.
///
/// Implementations must hand out an owned copy: the engine keeps using the
/// snapshot it received even if the underlying data changes mid-run.
pub trait CatalogSource: Send + Sync {
    fn snapshot(&self, college_scope: &str) -> EngineResult<CatalogSnapshot>;
}

/// Snapshots kept in memory, keyed by college scope.
#[derive(Default)]
pub struct InMemorySource {
    scopes: RwLock<HashMap<String, CatalogSnapshot>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: &str, snapshot: CatalogSnapshot) -> Self {
        let source = Self::new();
        source.put(scope, snapshot);
        source
    }

    /// Replaces a scope's data, as the administrative side does on edits.
    pub fn put(&self, scope: &str, snapshot: CatalogSnapshot) {
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        scopes.insert(scope.to_string(), snapshot);
    }

    pub fn update<F: FnOnce(&mut CatalogSnapshot)>(&self, scope: &str, edit: F) -> bool {
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        match scopes.get_mut(scope) {
            Some(snap) => {
                edit(snap);
                true
            }
            None => false,
        }
    }
}

impl CatalogSource for InMemorySource {
    fn snapshot(&self, college_scope: &str) -> EngineResult<CatalogSnapshot> {
        let scopes = self.scopes.read().unwrap_or_else(|e| e.into_inner());
        scopes
            .get(college_scope)
            .cloned()
            .ok_or_else(|| EngineError::UnknownScope(college_scope.to_string()))
    }
}

/// Reads `<root>/<scope>.json`, or a single file regardless of scope.
pub struct JsonFileSource {
    location: Location,
}

enum Location {
    Directory(PathBuf),
    File(PathBuf),
}

impl JsonFileSource {
    pub fn directory<P: AsRef<Path>>(root: P) -> Self {
        Self {
            location: Location::Directory(root.as_ref().to_path_buf()),
        }
    }

    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
        }
    }
}

impl CatalogSource for JsonFileSource {
    fn snapshot(&self, college_scope: &str) -> EngineResult<CatalogSnapshot> {
        let path = match &self.location {
            Location::File(p) => p.clone(),
            Location::Directory(root) => {
                let p = root.join(format!("{}.json", college_scope));
                if !p.exists() {
                    return Err(EngineError::UnknownScope(college_scope.to_string()));
                }
                p
            }
        };
        info!("Loader: reading catalog snapshot from {:?}", path);
        load_snapshot_from_file(path)
    }
}

pub fn load_snapshot_from_file<P: AsRef<Path>>(path: P) -> EngineResult<CatalogSnapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
