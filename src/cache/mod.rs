//! Local cache for offline reads and as a durability backstop.
//!
//! This module provides a storage-agnostic caching mechanism that:
//! - Keeps each collection as one whole JSON document under a fixed key
//! - Namespaces keys so several datasets can share one database
//! - Seeds a default document on first read

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{LocalStore, MemoryStorage, SqliteStorage};
pub use traits::{DataSource, Document, SyncResult};
