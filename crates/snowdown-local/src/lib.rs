use sha2::{Digest, Sha256};
use snowdown_core::{Error, Result, TextStore};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

pub mod catalog;
pub mod clean;
pub mod extract;
pub mod likes;
pub mod locate;
pub mod overrides;
pub mod resolve;
pub mod schedule_text;
pub mod selection;
pub mod textprep;

/// Filesystem-backed [`TextStore`]: one file per key under `root`.
///
/// Keys are hashed into the file name so arbitrary key strings are safe on
/// every filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("snowdown-cache")
    }

    pub fn with_default_dir() -> Self {
        Self::new(Self::default_dir())
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut h = Sha256::new();
        h.update(b"key:");
        h.update(key.as_bytes());
        let digest = hex::encode(h.finalize());
        self.root.join(&digest[0..2]).join(format!("{digest}.txt"))
    }
}

impl TextStore for FsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let p = self.path_for(key);
        match fs::read_to_string(&p) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Store(e.to_string())),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let p = self.path_for(key);
        let dir = p
            .parent()
            .ok_or_else(|| Error::Store(format!("no parent dir for {}", p.display())))?;
        fs::create_dir_all(dir).map_err(|e| Error::Store(e.to_string()))?;
        // Write to a sibling temp file and rename so readers never see a partial value.
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::Store(e.to_string()))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| Error::Store(e.to_string()))?;
        tmp.persist(&p).map_err(|e| Error::Store(e.to_string()))?;
        Ok(())
    }
}

/// In-process [`TextStore`]; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let m = self
            .entries
            .lock()
            .map_err(|_| Error::Store("memory store poisoned".to_string()))?;
        Ok(m.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut m = self
            .entries
            .lock()
            .map_err(|_| Error::Store("memory store poisoned".to_string()))?;
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use snowdown_core::{Error, Result, TextStore};

    /// Store that behaves like a full or disabled browser storage.
    pub struct ReadOnlyStore;

    impl TextStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn put(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Store("quota exceeded".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_round_trips_and_misses_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        assert_eq!(store.get("snowdown_schedule_text_v1").unwrap(), None);

        store.put("snowdown_schedule_text_v1", "POLAR PLUNGE").unwrap();
        assert_eq!(
            store.get("snowdown_schedule_text_v1").unwrap().as_deref(),
            Some("POLAR PLUNGE")
        );
        // Different keys never alias.
        assert_eq!(store.get("snowdown_schedule_text_v2").unwrap(), None);

        store.put("snowdown_schedule_text_v1", "overwritten").unwrap();
        assert_eq!(
            store.get("snowdown_schedule_text_v1").unwrap().as_deref(),
            Some("overwritten")
        );
    }

    #[test]
    fn fs_store_accepts_keys_with_path_separators() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().to_path_buf());
        store.put("../../etc/passwd", "x").unwrap();
        assert_eq!(store.get("../../etc/passwd").unwrap().as_deref(), Some("x"));
        assert!(store.path_for("../../etc/passwd").starts_with(dir.path()));
    }

    #[test]
    fn memory_store_counts_entries() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.put("a", "1").unwrap();
        store.put("a", "2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }
}
