//! Persistent Selection Store.
//!
//! A string key/value layer with localStorage semantics: synchronous, durable
//! before `set` returns, no TTL and no versioning.  `SelectionStore` puts typed
//! accessors for the current background and the favorite set on top of it.
//!
//! Corrupt or unreadable data never propagates: it is logged and read back as
//! absent / empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{FavoriteSet, FavoriteState, MediaItem};

/// Durable key holding the current background image URL.
pub const BACKGROUND_KEY: &str = "breathSelectedBackground";
/// Durable key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "favorites";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ── in-memory store ───────────────────────────────────────────────────────────

/// Process-local store.  Used when the data directory is unusable.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ── JSON file store ───────────────────────────────────────────────────────────

/// All keys live in one JSON object file.  Every mutation rewrites the file
/// (temp file + rename) before returning.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`.  A missing file is an empty store; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_entries(&path);
        debug!("store: opened {:?} with {} keys", path, entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(path: &Path) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("store: cannot read {:?}: {}; starting empty", path, e);
                return BTreeMap::new();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("store: {:?} is corrupt ({}); starting empty", path, e);
                BTreeMap::new()
            }
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ── typed selection store ─────────────────────────────────────────────────────

pub struct SelectionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SelectionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn background(&self) -> Option<String> {
        self.backend
            .get(BACKGROUND_KEY)
            .filter(|url| !url.trim().is_empty())
    }

    pub fn set_background(&mut self, url: &str) {
        if let Err(e) = self.backend.set(BACKGROUND_KEY, url) {
            warn!("store: failed to persist background: {}", e);
        }
    }

    pub fn clear_background(&mut self) {
        if let Err(e) = self.backend.remove(BACKGROUND_KEY) {
            warn!("store: failed to clear background: {}", e);
        }
    }

    /// Read the favorite set.  A corrupt entry yields an empty set; records
    /// that cannot be read as media items are skipped.
    pub fn favorites(&self) -> FavoriteSet {
        let Some(raw) = self.backend.get(FAVORITES_KEY) else {
            return FavoriteSet::new();
        };
        match parse_favorites(&raw) {
            Ok(set) => set,
            Err(e) => {
                warn!("store: {}", e);
                FavoriteSet::new()
            }
        }
    }

    pub fn save_favorites(&mut self, favorites: &FavoriteSet) {
        let json = match serde_json::to_string(favorites) {
            Ok(j) => j,
            Err(e) => {
                warn!("store: failed to encode favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.backend.set(FAVORITES_KEY, &json) {
            warn!("store: failed to persist favorites: {}", e);
        }
    }

    /// Flip `item` in the durable favorite set and write the whole set back.
    pub fn toggle_favorite(&mut self, item: &MediaItem) -> (FavoriteState, FavoriteSet) {
        let mut favorites = self.favorites();
        let state = favorites.toggle(item);
        self.save_favorites(&favorites);
        debug!("store: favorite {} -> {:?}", item.id, state);
        (state, favorites)
    }
}

fn parse_favorites(raw: &str) -> Result<FavoriteSet, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: FAVORITES_KEY.to_string(),
        reason,
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Null => return Ok(FavoriteSet::new()),
        other => return Err(corrupt(format!("expected a list, found {}", other))),
    };
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<MediaItem>(entry) {
            Ok(item) => items.push(item),
            Err(e) => debug!("store: skipping unreadable favorite: {}", e),
        }
    }
    Ok(FavoriteSet::from_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn photo(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            alt_text: String::new(),
            preview_urls: Map::new(),
            original_url: format!("https://img.example/{id}.jpg"),
        }
    }

    #[test]
    fn background_round_trip_and_clear() {
        let mut store = SelectionStore::new(MemoryStore::new());
        assert_eq!(store.background(), None);
        store.set_background("https://img.example/a.jpg");
        assert_eq!(
            store.background().as_deref(),
            Some("https://img.example/a.jpg")
        );
        store.clear_background();
        assert_eq!(store.background(), None);
    }

    #[test]
    fn empty_background_is_absent() {
        let mut store = SelectionStore::new(MemoryStore::new());
        store.set_background("");
        assert_eq!(store.background(), None);
    }

    #[test]
    fn non_json_favorites_read_as_empty() {
        let mut backend = MemoryStore::new();
        backend.set(FAVORITES_KEY, "{not json").unwrap();
        let store = SelectionStore::new(backend);
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn favorites_object_instead_of_list_reads_as_empty() {
        let mut backend = MemoryStore::new();
        backend.set(FAVORITES_KEY, r#"{"id": 1}"#).unwrap();
        let store = SelectionStore::new(backend);
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn null_entries_in_favorites_are_skipped() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                FAVORITES_KEY,
                r#"[{"id": 1, "alt": "a", "src": {"original": "https://x/1.jpg"}}, null]"#,
            )
            .unwrap();
        let store = SelectionStore::new(backend);
        let favs = store.favorites();
        assert_eq!(favs.len(), 1);
        assert!(favs.contains("1"));
    }

    #[test]
    fn toggle_favorite_writes_through() {
        let mut store = SelectionStore::new(MemoryStore::new());
        let (state, set) = store.toggle_favorite(&photo("9"));
        assert_eq!(state, FavoriteState::Favorited);
        assert!(set.contains("9"));
        assert!(store.favorites().contains("9"));

        let (state, _) = store.toggle_favorite(&photo("9"));
        assert_eq!(state, FavoriteState::NotFavorited);
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn file_store_flushes_every_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = JsonFileStore::open(&path);
        store.set(BACKGROUND_KEY, "https://img.example/b.jpg").unwrap();

        // A second instance sees the write without any explicit flush call.
        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get(BACKGROUND_KEY).as_deref(),
            Some("https://img.example/b.jpg")
        );

        store.remove(BACKGROUND_KEY).unwrap();
        assert_eq!(JsonFileStore::open(&path).get(BACKGROUND_KEY), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "this is not json").unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get(FAVORITES_KEY), None);

        // Writing replaces the corrupt file with a valid one.
        store.set(FAVORITES_KEY, "[]").unwrap();
        assert_eq!(
            JsonFileStore::open(&path).get(FAVORITES_KEY).as_deref(),
            Some("[]")
        );
    }
}
