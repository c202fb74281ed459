//! Typed document access on top of a key-value backend.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use super::storage::LocalStore;
use super::traits::Document;

/// Reads and writes whole JSON documents in one namespace of a local store.
///
/// There is no mutual exclusion across a read and the following write;
/// callers doing read-modify-write can lose concurrent updates.
pub struct CacheLayer<S: LocalStore> {
  storage: Arc<S>,
  namespace: String,
}

impl<S: LocalStore> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S, namespace: impl Into<String>) -> Self {
    Self::shared(Arc::new(storage), namespace)
  }

  /// Create a cache layer over storage that is also used elsewhere.
  pub fn shared(storage: Arc<S>, namespace: impl Into<String>) -> Self {
    Self {
      storage,
      namespace: namespace.into(),
    }
  }

  pub fn storage(&self) -> &Arc<S> {
    &self.storage
  }

  /// Load a document, `None` if it was never written.
  ///
  /// A stored value that does not parse is an error; it is never replaced
  /// silently.
  pub fn load<T: Document>(&self) -> Result<Option<T>> {
    let key = T::cache_key();
    match self.storage.get(&self.namespace, key)? {
      Some(raw) => {
        let value = serde_json::from_str(&raw)
          .map_err(|e| eyre!("Failed to parse cached {}: {}", key, e))?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  /// Replace a document.
  pub fn store<T: Document>(&self, value: &T) -> Result<()> {
    let key = T::cache_key();
    let raw =
      serde_json::to_string(value).map_err(|e| eyre!("Failed to serialize {}: {}", key, e))?;
    self.storage.set(&self.namespace, key, &raw)
  }

  /// Load a document, writing `seed` first if nothing is cached yet.
  ///
  /// The boolean is true when the seed was written.
  pub fn load_or_seed<T, F>(&self, seed: F) -> Result<(T, bool)>
  where
    T: Document,
    F: FnOnce() -> T,
  {
    if let Some(existing) = self.load::<T>()? {
      return Ok((existing, false));
    }

    let value = seed();
    self.store(&value)?;
    Ok((value, true))
  }
}

impl<S: LocalStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      namespace: self.namespace.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Counter {
    value: u32,
  }

  impl Document for Counter {
    fn cache_key() -> &'static str {
      "counter"
    }
  }

  #[test]
  fn test_load_missing_is_none() {
    let cache = CacheLayer::new(MemoryStorage::new(), "test");
    assert_eq!(cache.load::<Counter>().unwrap(), None);
  }

  #[test]
  fn test_seed_written_once() {
    let cache = CacheLayer::new(MemoryStorage::new(), "test");

    let (first, seeded) = cache.load_or_seed(|| Counter { value: 1 }).unwrap();
    assert!(seeded);
    assert_eq!(first.value, 1);

    let (second, seeded) = cache.load_or_seed(|| Counter { value: 2 }).unwrap();
    assert!(!seeded);
    assert_eq!(second.value, 1);
  }

  #[test]
  fn test_namespaces_are_isolated() {
    let storage = Arc::new(MemoryStorage::new());
    let a = CacheLayer::shared(Arc::clone(&storage), "a");
    let b = CacheLayer::shared(storage, "b");

    a.store(&Counter { value: 7 }).unwrap();
    assert_eq!(b.load::<Counter>().unwrap(), None);
    assert_eq!(a.load::<Counter>().unwrap(), Some(Counter { value: 7 }));
  }

  #[test]
  fn test_corrupt_document_is_an_error() {
    let storage = MemoryStorage::new();
    storage.set("test", "counter", "{not json").unwrap();
    let cache = CacheLayer::new(storage, "test");

    let err = cache.load::<Counter>().unwrap_err();
    assert!(err.to_string().contains("counter"));
    assert!(cache.load_or_seed(|| Counter { value: 3 }).is_err());
  }
}
