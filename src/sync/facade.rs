//! Single read/write API over the local cache and the remote store.

use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, Document, LocalStore, SyncResult};
use crate::model::{CatalogData, NewProject, Project};
use crate::remote::{CatalogRow, ProjectRow, RemoteStore};

use super::clock::{Clock, SystemClock};

impl Document for Vec<Project> {
  fn cache_key() -> &'static str {
    "projects"
  }
}

impl Document for CatalogData {
  fn cache_key() -> &'static str {
    "catalog"
  }
}

/// Outcome of the once-per-session remote probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
  /// The probe succeeded; `projects` is the row count it reported
  Online { projects: u64 },
  /// The probe failed; the session works against the local cache only
  Offline,
}

impl Connectivity {
  pub fn is_online(self) -> bool {
    matches!(self, Connectivity::Online { .. })
  }
}

/// Local-first store for projects and the catalog.
///
/// Every write lands in the local cache first and is then pushed to the
/// remote on a best-effort basis; remote failures are logged, not
/// returned. Reads prefer a non-empty remote result and otherwise fall back
/// to the cache.
///
/// Writes re-read and rewrite the whole project collection. Two saves that
/// overlap at an await point can therefore drop one another's change from
/// the local cache.
pub struct SyncFacade<R: RemoteStore + ?Sized, S: LocalStore> {
  remote: Arc<R>,
  cache: CacheLayer<S>,
  clock: Arc<dyn Clock>,
  /// Probed lazily and never retried
  connectivity: OnceCell<Connectivity>,
  /// Last id handed out by `create_project`
  last_id: Mutex<i64>,
}

impl<R: RemoteStore + ?Sized, S: LocalStore> SyncFacade<R, S> {
  pub fn new(remote: Arc<R>, cache: CacheLayer<S>) -> Self {
    Self {
      remote,
      cache,
      clock: Arc::new(SystemClock),
      connectivity: OnceCell::new(),
      last_id: Mutex::new(0),
    }
  }

  /// Replace the time source.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  /// Remote reachability for this session, probing on first call.
  pub async fn connectivity(&self) -> Connectivity {
    *self
      .connectivity
      .get_or_init(|| async {
        match self.remote.count_projects().await {
          Ok(projects) => {
            info!(projects, "remote store reachable");
            Connectivity::Online { projects }
          }
          Err(e) => {
            info!(error = %e, "remote store unreachable, working from local cache");
            Connectivity::Offline
          }
        }
      })
      .await
  }

  // ==========================================================================
  // Projects
  // ==========================================================================

  /// All projects.
  pub async fn list_projects(&self) -> Result<Vec<Project>> {
    Ok(self.list_projects_with_source().await?.data)
  }

  /// All projects, along with where they were read from.
  ///
  /// A reachable remote with no rows is not trusted: the local cache wins,
  /// even if it holds projects the remote no longer has.
  pub async fn list_projects_with_source(&self) -> Result<SyncResult<Vec<Project>>> {
    debug!("listing projects");

    if self.connectivity().await.is_online() {
      match self.fetch_remote_projects().await {
        Ok(projects) if !projects.is_empty() => {
          self.cache.store(&projects)?;
          return Ok(SyncResult::from_remote(projects));
        }
        Ok(_) => debug!("remote has no projects, falling back to local cache"),
        Err(e) => warn!(error = %e, "failed to fetch projects from remote"),
      }
    }

    let (projects, seeded) = self.cache.load_or_seed(Vec::<Project>::new)?;
    if seeded {
      Ok(SyncResult::seeded(projects))
    } else {
      Ok(SyncResult::from_cache(projects))
    }
  }

  async fn fetch_remote_projects(&self) -> Result<Vec<Project>> {
    let rows = self.remote.fetch_projects().await?;

    let projects = rows
      .into_iter()
      .filter_map(|row| {
        let id = row.id.clone();
        match row.into_project() {
          Ok(project) => Some(project),
          Err(e) => {
            warn!(id = %id, error = %e, "skipping unreadable remote project");
            None
          }
        }
      })
      .collect();

    Ok(projects)
  }

  /// Look up one project by id.
  pub async fn get_project(&self, id: &str) -> Result<Option<Project>> {
    let projects = self.list_projects().await?;
    Ok(projects.into_iter().find(|p| p.id == id))
  }

  /// Stamp `updated_at` and store the project.
  ///
  /// Succeeds once the local cache is written; the remote upsert that
  /// follows may fail without affecting the result.
  pub async fn save_project(&self, mut project: Project) -> Result<Project> {
    project.updated_at = self.clock.now_millis();
    self.store_project(project).await
  }

  /// Create a project with a fresh id and matching timestamps.
  pub async fn create_project(&self, new: NewProject) -> Result<Project> {
    let now = self.next_id_millis()?;
    let project = new.into_project(now.to_string(), now);
    debug!(id = %project.id, name = %project.name, "creating project");
    self.store_project(project).await
  }

  /// Current time, bumped past the last id handed out so that ids never
  /// repeat within a session.
  fn next_id_millis(&self) -> Result<i64> {
    let mut last = self
      .last_id
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let now = self.clock.now_millis().max(*last + 1);
    *last = now;
    Ok(now)
  }

  async fn store_project(&self, project: Project) -> Result<Project> {
    debug!(id = %project.id, "saving project");
    let online = self.connectivity().await.is_online();

    let mut projects = self.list_projects().await?;
    match projects.iter_mut().find(|p| p.id == project.id) {
      Some(existing) => *existing = project.clone(),
      None => projects.push(project.clone()),
    }
    self.cache.store(&projects)?;

    if online {
      if let Err(e) = self.push_project(&project).await {
        warn!(id = %project.id, error = %e, "remote save failed, project kept locally");
      }
    } else {
      debug!(id = %project.id, "remote unreachable, project saved locally only");
    }

    Ok(project)
  }

  async fn push_project(&self, project: &Project) -> Result<()> {
    let row = ProjectRow::from_project(project)?;
    self.remote.upsert_project(&row).await
  }

  /// Remove a project. Deleting an unknown id is not an error.
  pub async fn delete_project(&self, id: &str) -> Result<()> {
    debug!(id, "deleting project");

    let mut projects = self.list_projects().await?;
    projects.retain(|p| p.id != id);
    self.cache.store(&projects)?;

    if self.connectivity().await.is_online() {
      if let Err(e) = self.remote.delete_project(id).await {
        warn!(id, error = %e, "remote delete failed");
      }
    }

    Ok(())
  }

  // ==========================================================================
  // Catalog
  // ==========================================================================

  pub async fn get_catalog(&self) -> Result<CatalogData> {
    Ok(self.get_catalog_with_source().await?.data)
  }

  /// The catalog, seeding the default presets when nothing is stored
  /// anywhere.
  pub async fn get_catalog_with_source(&self) -> Result<SyncResult<CatalogData>> {
    debug!("loading catalog");
    let online = self.connectivity().await.is_online();

    if online {
      match self.remote.fetch_catalog().await {
        Ok(Some(row)) => {
          let catalog = row.into_catalog();
          self.cache.store(&catalog)?;
          return Ok(SyncResult::from_remote(catalog));
        }
        Ok(None) => debug!("remote has no catalog"),
        Err(e) => warn!(error = %e, "failed to fetch catalog from remote"),
      }
    }

    if let Some(catalog) = self.cache.load::<CatalogData>()? {
      return Ok(SyncResult::from_cache(catalog));
    }

    let catalog = CatalogData::default_presets();
    self.cache.store(&catalog)?;
    if online {
      self.push_catalog(&catalog).await;
    }

    Ok(SyncResult::seeded(catalog))
  }

  pub async fn save_catalog(&self, catalog: &CatalogData) -> Result<()> {
    debug!(
      materials = catalog.materials.len(),
      machines = catalog.machines.len(),
      "saving catalog"
    );
    self.cache.store(catalog)?;

    if self.connectivity().await.is_online() {
      self.push_catalog(catalog).await;
    }

    Ok(())
  }

  async fn push_catalog(&self, catalog: &CatalogData) {
    let pushed = match CatalogRow::from_catalog(catalog, self.clock.now_millis()) {
      Ok(row) => self.remote.upsert_catalog(&row).await,
      Err(e) => Err(e),
    };
    if let Err(e) = pushed {
      warn!(error = %e, "remote catalog save failed");
    }
  }
}
