//! Core traits and types for the local cache.

use serde::{de::DeserializeOwned, Serialize};

/// A value stored in the cache as one whole JSON document under a fixed key.
///
/// Documents are always read and written in full; there is no per-record
/// patching.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
  /// Key within the cache namespace (e.g., "projects", "catalog")
  fn cache_key() -> &'static str;
}

/// Result of a read, including data and metadata about where it came from.
#[derive(Debug, Clone)]
pub struct SyncResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: DataSource,
}

impl<T> SyncResult<T> {
  /// Data fetched from the remote store.
  pub fn from_remote(data: T) -> Self {
    Self {
      data,
      source: DataSource::Remote,
    }
  }

  /// Data read from the local cache.
  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: DataSource::Cache,
    }
  }

  /// Cache was empty and has just been seeded.
  pub fn seeded(data: T) -> Self {
    Self {
      data,
      source: DataSource::Seeded,
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  /// Fresh data from the remote store
  Remote,
  /// Previously cached data
  Cache,
  /// Nothing was cached; a default was written and returned
  Seeded,
}

impl DataSource {
  pub fn label(self) -> &'static str {
    match self {
      DataSource::Remote => "remote",
      DataSource::Cache => "local cache",
      DataSource::Seeded => "new local cache",
    }
  }
}
