//! Remote store trait.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};

use super::api_types::{CatalogRow, ProjectRow};

/// Table-level access to the hosted database.
///
/// Rows are keyed by `id`; upserts insert or replace on that key. The
/// catalog table holds a single row keyed `"default"`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  /// Cheap existence check; returns the number of project rows.
  async fn count_projects(&self) -> Result<u64>;

  /// Every project row, newest first.
  async fn fetch_projects(&self) -> Result<Vec<ProjectRow>>;

  async fn upsert_project(&self, row: &ProjectRow) -> Result<()>;

  async fn delete_project(&self, id: &str) -> Result<()>;

  /// The catalog singleton, `None` if the row does not exist.
  async fn fetch_catalog(&self) -> Result<Option<CatalogRow>>;

  async fn upsert_catalog(&self, row: &CatalogRow) -> Result<()>;
}

/// Remote that is never reachable.
/// Used when no remote is configured - every call fails.
#[derive(Debug, Default)]
pub struct OfflineRemote;

#[async_trait]
impl RemoteStore for OfflineRemote {
  async fn count_projects(&self) -> Result<u64> {
    Err(eyre!("No remote store configured"))
  }

  async fn fetch_projects(&self) -> Result<Vec<ProjectRow>> {
    Err(eyre!("No remote store configured"))
  }

  async fn upsert_project(&self, _row: &ProjectRow) -> Result<()> {
    Err(eyre!("No remote store configured"))
  }

  async fn delete_project(&self, _id: &str) -> Result<()> {
    Err(eyre!("No remote store configured"))
  }

  async fn fetch_catalog(&self) -> Result<Option<CatalogRow>> {
    Err(eyre!("No remote store configured"))
  }

  async fn upsert_catalog(&self, _row: &CatalogRow) -> Result<()> {
    Err(eyre!("No remote store configured"))
  }
}
