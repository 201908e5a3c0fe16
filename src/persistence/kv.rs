use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key holding the whole comparison as one record. The record's fields are
/// the logical collections `comparables`, `metrics` and `ratingMatrix`, so a
/// single write replaces all three together.
pub const COMPARISON_KEY: &str = "comparison";

/// Byte store keyed by logical name.
pub trait KeyValueStore {
    /// Ok(None) when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Content-addressed on-disk store backed by cacache.
///
/// Overwriting or removing a key also deletes the content it pointed to,
/// unless another key still references the same bytes.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, key: &str) -> Result<Option<cacache::Metadata>> {
        cacache::metadata_sync(&self.root, key)
            .with_context(|| format!("Failed to look up '{}' in {}", key, self.root.display()))
    }

    /// Delete content no key refers to any more. Failures only cost disk space.
    fn release(&self, superseded: cacache::Metadata) {
        let still_used = cacache::list_sync(&self.root)
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.integrity == superseded.integrity);
        if still_used {
            return;
        }
        match cacache::remove_hash_sync(&self.root, &superseded.integrity) {
            Ok(()) => debug!(key = %superseded.key, "removed superseded content"),
            Err(e) => warn!(key = %superseded.key, error = %e, "failed to remove superseded content"),
        }
    }
}

impl KeyValueStore for DiskStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.entry(key)?.is_none() {
            return Ok(None);
        }
        let bytes = cacache::read_sync(&self.root, key)
            .with_context(|| format!("Failed to read '{}' from {}", key, self.root.display()))?;
        Ok(Some(bytes))
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let previous = self.entry(key)?;
        let integrity = cacache::write_sync(&self.root, key, value)
            .with_context(|| format!("Failed to write '{}' to {}", key, self.root.display()))?;
        if let Some(previous) = previous.filter(|p| p.integrity != integrity) {
            self.release(previous);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let previous = self.entry(key)?;
        cacache::remove_sync(&self.root, key)
            .with_context(|| format!("Failed to remove '{}' from {}", key, self.root.display()))?;
        if let Some(previous) = previous {
            self.release(previous);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_store(name: &str) -> DiskStore {
        let root = env::temp_dir().join(format!("comparo_test_kv_{}", name));
        let _ = std::fs::remove_dir_all(&root);
        DiskStore::new(root)
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), None);

        store.write(COMPARISON_KEY, b"{}").unwrap();
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), Some(b"{}".to_vec()));

        store.remove(COMPARISON_KEY).unwrap();
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), None);
    }

    #[test]
    fn test_disk_store_missing_key() {
        let store = temp_store("missing");
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), None);
    }

    #[test]
    fn test_disk_store_overwrite_and_remove() {
        let mut store = temp_store("overwrite");

        store.write(COMPARISON_KEY, b"[[1]]").unwrap();
        store.write(COMPARISON_KEY, b"[[2]]").unwrap();
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), Some(b"[[2]]".to_vec()));

        store.remove(COMPARISON_KEY).unwrap();
        assert_eq!(store.read(COMPARISON_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_disk_store_drops_superseded_content() {
        let mut store = temp_store("superseded");

        store.write(COMPARISON_KEY, b"first").unwrap();
        let first = store.entry(COMPARISON_KEY).unwrap().unwrap().integrity;
        store.write(COMPARISON_KEY, b"second").unwrap();
        let second = store.entry(COMPARISON_KEY).unwrap().unwrap().integrity;

        assert!(cacache::read_hash_sync(store.root(), &first).is_err());
        assert_eq!(cacache::read_hash_sync(store.root(), &second).unwrap(), b"second");

        store.remove(COMPARISON_KEY).unwrap();
        assert!(cacache::read_hash_sync(store.root(), &second).is_err());

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_disk_store_keeps_content_shared_with_other_keys() {
        let mut store = temp_store("shared");

        store.write("a", b"same").unwrap();
        store.write("b", b"same").unwrap();
        store.write("a", b"changed").unwrap();

        assert_eq!(store.read("b").unwrap(), Some(b"same".to_vec()));

        let _ = std::fs::remove_dir_all(store.root());
    }
}
