//! In-memory remote store for exercising the sync layer.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::remote::{CatalogRow, ProjectRow, RemoteStore};

/// Remote that keeps rows as JSON values, the way they travel over the wire.
#[derive(Debug, Default)]
pub struct FakeRemote {
  reachable: bool,
  yield_on_fetch: bool,
  fail_writes: AtomicBool,
  fail_reads: AtomicBool,
  projects: Mutex<Vec<Value>>,
  catalog: Mutex<Option<Value>>,
  pub probes: AtomicUsize,
  pub upserts: AtomicUsize,
  pub deletes: AtomicUsize,
}

impl FakeRemote {
  pub fn online() -> Self {
    Self {
      reachable: true,
      ..Self::default()
    }
  }

  pub fn offline() -> Self {
    Self::default()
  }

  /// Suspend once after reading, like a response still in flight.
  pub fn yielding(mut self) -> Self {
    self.yield_on_fetch = true;
    self
  }

  pub fn with_rows(self, rows: &[ProjectRow]) -> Self {
    self.with_raw_rows(rows.iter().map(|r| serde_json::to_value(r).unwrap()))
  }

  /// Rows exactly as the table returns them, malformed ones included.
  pub fn with_raw_rows(self, rows: impl IntoIterator<Item = Value>) -> Self {
    self.projects.lock().unwrap().extend(rows);
    self
  }

  pub fn with_catalog(self, row: &CatalogRow) -> Self {
    *self.catalog.lock().unwrap() = Some(serde_json::to_value(row).unwrap());
    self
  }

  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Keep answering the probe but fail every fetch.
  pub fn fail_reads(&self, fail: bool) {
    self.fail_reads.store(fail, Ordering::SeqCst);
  }

  pub fn rows(&self) -> Vec<ProjectRow> {
    let projects = self.projects.lock().unwrap();
    projects
      .iter()
      .map(|v| serde_json::from_value(v.clone()).unwrap())
      .collect()
  }

  pub fn catalog_row(&self) -> Option<CatalogRow> {
    let catalog = self.catalog.lock().unwrap();
    catalog
      .as_ref()
      .map(|v| serde_json::from_value(v.clone()).unwrap())
  }

  fn check_reachable(&self) -> Result<()> {
    if self.reachable {
      Ok(())
    } else {
      Err(eyre!("connection refused"))
    }
  }

  fn check_readable(&self) -> Result<()> {
    self.check_reachable()?;
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(eyre!("statement timeout"));
    }
    Ok(())
  }

  fn check_writable(&self) -> Result<()> {
    self.check_reachable()?;
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(eyre!("permission denied for table"));
    }
    Ok(())
  }
}

#[async_trait]
impl RemoteStore for FakeRemote {
  async fn count_projects(&self) -> Result<u64> {
    self.probes.fetch_add(1, Ordering::SeqCst);
    self.check_reachable()?;
    Ok(self.projects.lock().unwrap().len() as u64)
  }

  async fn fetch_projects(&self) -> Result<Vec<ProjectRow>> {
    self.check_readable()?;
    let snapshot = { self.projects.lock().unwrap().clone() };
    if self.yield_on_fetch {
      tokio::task::yield_now().await;
    }

    let mut rows: Vec<ProjectRow> = snapshot
      .into_iter()
      .filter_map(|v| serde_json::from_value(v).ok())
      .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(rows)
  }

  async fn upsert_project(&self, row: &ProjectRow) -> Result<()> {
    self.check_writable()?;
    self.upserts.fetch_add(1, Ordering::SeqCst);
    let value = serde_json::to_value(row)?;
    let mut projects = self.projects.lock().unwrap();
    match projects.iter_mut().find(|v| v["id"] == value["id"]) {
      Some(existing) => *existing = value,
      None => projects.push(value),
    }
    Ok(())
  }

  async fn delete_project(&self, id: &str) -> Result<()> {
    self.check_writable()?;
    self.deletes.fetch_add(1, Ordering::SeqCst);
    self.projects.lock().unwrap().retain(|v| v["id"] != id);
    Ok(())
  }

  async fn fetch_catalog(&self) -> Result<Option<CatalogRow>> {
    self.check_readable()?;
    let value = { self.catalog.lock().unwrap().clone() };
    Ok(value.map(serde_json::from_value).transpose()?)
  }

  async fn upsert_catalog(&self, row: &CatalogRow) -> Result<()> {
    self.check_writable()?;
    *self.catalog.lock().unwrap() = Some(serde_json::to_value(row)?);
    Ok(())
  }
}
