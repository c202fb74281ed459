//! Local key-value storage trait and its implementations.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Trait for local persistence backends.
///
/// Values are opaque strings keyed by `(namespace, key)`. Every write is
/// durable once the call returns.
pub trait LocalStore: Send + Sync {
  /// Read the value stored under a key.
  fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

  /// Store a value, replacing any previous one.
  fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;

  /// Remove a key. Missing keys are not an error.
  fn remove(&self, namespace: &str, key: &str) -> Result<()>;
}

/// In-process storage that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl LocalStore for MemoryStorage {
  fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(&(namespace.to_string(), key.to_string())).cloned())
  }

  fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert((namespace.to_string(), key.to_string()), value.to_string());
    Ok(())
  }

  fn remove(&self, namespace: &str, key: &str) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.remove(&(namespace.to_string(), key.to_string()));
    Ok(())
  }
}

/// SQLite-based storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a throwaway database that lives in memory.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("sitebook").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Whole-document key-value store
CREATE TABLE IF NOT EXISTS kv_store (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (namespace, key)
);
"#;

impl LocalStore for SqliteStorage {
  fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .query_row(
        "SELECT value FROM kv_store WHERE namespace = ? AND key = ?",
        params![namespace, key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache key {}/{}: {}", namespace, key, e))
  }

  fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv_store (namespace, key, value, written_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![namespace, key, value],
      )
      .map_err(|e| eyre!("Failed to write cache key {}/{}: {}", namespace, key, e))?;

    Ok(())
  }

  fn remove(&self, namespace: &str, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM kv_store WHERE namespace = ? AND key = ?",
        params![namespace, key],
      )
      .map_err(|e| eyre!("Failed to remove cache key {}/{}: {}", namespace, key, e))?;

    Ok(())
  }
}
