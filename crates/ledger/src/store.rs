//! Key-value persistence for the stats blob and the theme preference.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use common::Error;
use tracing::debug;

/// Key of the JSON stats-plus-history blob.
pub const STATS_KEY: &str = "algopred_stats.json";
/// Key of the theme preference (`dark` or `light`).
pub const THEME_KEY: &str = "algopred_theme";
/// Key of the predictions issued but not yet settled.
pub const PENDING_KEY: &str = "algopred_pending.json";

/// String blobs addressed by key.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

/// Remove every blob this application writes.
pub fn clear_all(store: &mut dyn KvStore) -> Result<(), Error> {
    store.remove(STATS_KEY)?;
    store.remove(THEME_KEY)?;
    store.remove(PENDING_KEY)
}

fn validate_key(key: &str) -> Result<(), Error> {
    let ok = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid key: {key:?}")))
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Storage(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, Error> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("read {}: {}", path.display(), e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path(key)?;
        // Write-then-rename so a crash never leaves a half-written blob.
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)
            .map_err(|e| Error::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Storage(format!("rename to {}: {}", path.display(), e)))?;
        debug!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("remove {}: {}", path.display(), e))),
        }
    }
}

/// In-memory store, for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("kv");
        let mut store = FileStore::open(&dir).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        // A second handle on the same directory sees the value.
        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        store.remove(THEME_KEY).unwrap();
        store.remove(THEME_KEY).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("a/b").is_err());
        assert!(store.set("", "x").is_err());
    }

    #[test]
    fn test_clear_all_removes_owned_keys() {
        let mut store = MemoryStore::new();
        store.set(STATS_KEY, "{}").unwrap();
        store.set(THEME_KEY, "dark").unwrap();
        store.set(PENDING_KEY, "[]").unwrap();
        store.set("unrelated", "keep").unwrap();
        clear_all(&mut store).unwrap();
        assert_eq!(store.get(STATS_KEY).unwrap(), None);
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
        assert_eq!(store.get(PENDING_KEY).unwrap(), None);
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("keep"));
    }
}
