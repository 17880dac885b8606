use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StorageError;

/// Durable string key-value medium backing the stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key under `root`. Writes replace the file atomically.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    // Temp files start with `.`, which no valid key does.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{key}.tmp"))
    }

    fn write_atomic(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let temp_path = self.temp_path_for(key);
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_atomic(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// Keys become file names, so keep them to a portable, non-hidden charset.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// In-process store. With a quota it behaves like browser local storage and
/// refuses writes that would push the total size over the limit.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(limit),
        }
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            quota: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = others + entry_size(key, value);
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_values_and_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        store.ensure_dirs().unwrap();

        assert_eq!(store.get("tasks").unwrap(), None);
        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));

        store.set("tasks", "[1]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[1]"));
        assert!(!dir.path().join("data").join(".tasks.tmp").exists());

        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
        // Removing again is fine.
        store.remove("tasks").unwrap();
    }

    #[test]
    fn file_store_write_leaves_sibling_tmp_key_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.set("tasks.tmp", "precious").unwrap();
        store.set("tasks", "[]").unwrap();
        assert_eq!(store.get("tasks.tmp").unwrap().as_deref(), Some("precious"));
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_rejects_keys_that_are_not_plain_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(store.set("theme", "dark").is_ok());
        assert!(store.set("tasks.v1", "[]").is_ok());
    }

    #[test]
    fn file_store_write_fails_when_root_is_missing_or_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing"));
        assert!(matches!(store.set("tasks", "[]"), Err(StorageError::Io(_))));

        let blocked = dir.path().join("blocked");
        fs::create_dir_all(blocked.join("tasks")).unwrap();
        let store = FileStore::new(blocked);
        assert!(store.set("tasks", "[]").is_err());
        assert!(store.get("tasks").is_err());
    }

    #[test]
    fn memory_store_enforces_quota_per_total_size() {
        let store = MemoryStore::with_quota(16);
        store.set("tasks", "[]").unwrap();
        let err = store.set("categories", "[]").unwrap_err();
        match err {
            StorageError::QuotaExceeded { key, needed, limit } => {
                assert_eq!(key, "categories");
                assert_eq!(needed, 7 + 12);
                assert_eq!(limit, 16);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.get("categories").unwrap(), None);

        // Overwriting an entry only counts its new size.
        store.set("tasks", "[1,2,3,4]").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[1,2,3,4]"));
    }

    #[test]
    fn memory_store_can_be_seeded() {
        let store = MemoryStore::with_entries([("theme", "dark")]);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        store.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }
}
