//! Learned query → candidate mappings confirmed by users.
//!
//! Storage lives behind [`PreferenceBackend`]; the store reads through to the
//! backend on every lookup and replaces the whole mapping on every write.

use crate::error::{FactResolverError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub normalized_query: String,
    pub financial_type: String,
    pub data_type: String,
    pub item_code: String,
}

pub type PreferenceMap = BTreeMap<String, PreferenceEntry>;

pub trait PreferenceBackend: Send + Sync {
    fn load(&self) -> Result<PreferenceMap>;
    fn save(&self, entries: &PreferenceMap) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<PreferenceMap>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load(&self) -> Result<PreferenceMap> {
        let guard = self
            .entries
            .read()
            .map_err(|_| FactResolverError::PreferenceBackend("lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, entries: &PreferenceMap) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| FactResolverError::PreferenceBackend("lock poisoned".to_string()))?;
        *guard = entries.clone();
        Ok(())
    }
}

/// Pretty-printed JSON document on disk. A missing file reads as an empty
/// store; writes go to a sibling temp file that is renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn load(&self) -> Result<PreferenceMap> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(PreferenceMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PreferenceMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &PreferenceMap) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Lower-cases, trims and collapses whitespace.
pub fn normalize_query_key(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct PreferenceStore {
    backend: Box<dyn PreferenceBackend>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(backend: impl PreferenceBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }

    pub fn try_get(&self, normalized_query: &str) -> Result<Option<PreferenceEntry>> {
        Ok(self.backend.load()?.remove(normalized_query))
    }

    /// Backend failures read as "no preference".
    pub fn get(&self, normalized_query: &str) -> Option<PreferenceEntry> {
        match self.try_get(normalized_query) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Preference lookup failed, continuing without: {}", e);
                None
            }
        }
    }

    /// First entry found among `keys`, loading the backend once.
    pub fn get_any(&self, keys: &[String]) -> Option<PreferenceEntry> {
        match self.backend.load() {
            Ok(map) => keys.iter().find_map(|k| map.get(k).cloned()),
            Err(e) => {
                warn!("Preference lookup failed, continuing without: {}", e);
                None
            }
        }
    }

    pub fn put(&self, normalized_query: &str, entry: PreferenceEntry) -> Result<()> {
        self.put_all(&[normalized_query.to_string()], entry)
    }

    /// Writes the same target under every key in one load-modify-replace
    /// cycle. Concurrent writers are serialized; the last one wins.
    pub fn put_all(&self, keys: &[String], entry: PreferenceEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.backend.load()?;
        for key in keys {
            map.insert(
                key.clone(),
                PreferenceEntry {
                    normalized_query: key.clone(),
                    ..entry.clone()
                },
            );
        }
        self.backend.save(&map)
    }

    pub fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.backend.save(&PreferenceMap::new())
    }

    pub fn entries(&self) -> Result<PreferenceMap> {
        self.backend.load()
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(code: &str) -> PreferenceEntry {
        PreferenceEntry {
            normalized_query: String::new(),
            financial_type: "Projection".to_string(),
            data_type: "Gross Profit".to_string(),
            item_code: code.to_string(),
        }
    }

    #[test]
    fn test_normalize_query_key() {
        assert_eq!(normalize_query_key("  What is   the GP? "), "what is the gp?");
    }

    #[test]
    fn test_put_get_and_reset() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.get("gp"), None);

        store
            .put_all(&["gp".to_string(), "gross profit".to_string()], entry("3"))
            .unwrap();
        let found = store.get("gross profit").unwrap();
        assert_eq!(found.item_code, "3");
        assert_eq!(found.normalized_query, "gross profit");

        store.put("gp", entry("5")).unwrap();
        assert_eq!(store.get("gp").unwrap().item_code, "5");
        assert_eq!(store.get("gross profit").unwrap().item_code, "3");

        store.reset().unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = PreferenceStore::json_file(&path);
        assert!(store.entries().unwrap().is_empty());
        store.put("gp", entry("3")).unwrap();

        let reopened = PreferenceStore::json_file(&path);
        assert_eq!(reopened.get("gp").unwrap().item_code, "3");
    }

    #[test]
    fn test_corrupt_file_reads_as_no_preference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = PreferenceStore::json_file(&path);
        assert!(store.try_get("gp").is_err());
        assert_eq!(store.get("gp"), None);
        assert!(store.put("gp", entry("3")).is_err());
    }

    #[test]
    fn test_concurrent_writers_keep_every_key() {
        let store = Arc::new(PreferenceStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.put(&format!("query {}", i), entry("3")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(store.entries().unwrap().len(), 8);
    }
}
