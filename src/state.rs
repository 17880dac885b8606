//! Plumbing shared by the stores: lock access, load-with-fallback and
//! whole-collection writes.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{error, warn};

use crate::error::{DecodeError, PersistenceError};
use crate::storage::KeyValueStore;

/// A panicking listener or caller must not brick the store; the collection is
/// only ever replaced wholesale, so the inner value is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reads and decodes `key`. `None` when the key is absent, unreadable or corrupt.
pub(crate) fn load_collection<T>(
    storage: &dyn KeyValueStore,
    key: &str,
    decode: fn(&str) -> Result<Vec<T>, DecodeError>,
) -> Option<Vec<T>> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("read failed key={key} err={err}; using fallback");
            return None;
        }
    };
    match decode(&raw) {
        Ok(items) => Some(items),
        Err(err) => {
            warn!("decode failed key={key} err={err}; using fallback");
            None
        }
    }
}

/// Serializes the entire collection and writes it under `key`.
pub(crate) fn persist_collection<T>(
    storage: &dyn KeyValueStore,
    key: &str,
    items: &[T],
    encode: fn(&[T]) -> Result<String, serde_json::Error>,
) -> Result<(), PersistenceError> {
    let raw = encode(items).map_err(|source| PersistenceError::Encode {
        key: key.to_string(),
        source,
    })?;
    write_value(storage, key, &raw)
}

pub(crate) fn write_value(
    storage: &dyn KeyValueStore,
    key: &str,
    value: &str,
) -> Result<(), PersistenceError> {
    storage.set(key, value).map_err(|source| {
        error!("write failed key={key} bytes={} err={source}", value.len());
        PersistenceError::Write {
            key: key.to_string(),
            source,
        }
    })
}


#[cfg(test)]
mod tests {
    use super::testing::FlakyStore;
    use super::*;
    use crate::codec;
    use crate::storage::MemoryStore;
    use std::sync::atomic::Ordering;

    #[test]
    fn load_collection_falls_back_on_absent_corrupt_or_unreadable() {
        let store = MemoryStore::with_entries([("tasks", "{{{"), ("ok", "[]")]);
        assert!(load_collection(&store, "missing", codec::decode_tasks).is_none());
        assert!(load_collection(&store, "tasks", codec::decode_tasks).is_none());
        assert_eq!(
            load_collection(&store, "ok", codec::decode_tasks).map(|t| t.len()),
            Some(0)
        );

        let flaky = FlakyStore::default();
        flaky.inner.set("ok", "[]").unwrap();
        flaky.fail_reads.store(true, Ordering::SeqCst);
        assert!(load_collection(&flaky, "ok", codec::decode_tasks).is_none());
    }

    #[test]
    fn persist_collection_reports_key_on_write_failure() {
        let store = FlakyStore::failing();
        let err = persist_collection(&store, "tasks", &[], codec::encode_tasks).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { ref key, .. } if key == "tasks"));
    }
}
