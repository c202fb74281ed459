use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cache::{CacheLayer, SqliteStorage};
use crate::config::{Config, RemoteConfig};
use crate::enrich::{Geocoder, WeatherClient};
use crate::model::{
  CatalogData, CatalogItem, Coordinates, DocumentItem, DocumentKind, NewProject, Project,
  ProjectStatus,
};
use crate::query::{ProjectQuery, SortOrder, StatusCounts, StatusFilter};
use crate::remote::client::{file_name_from_url, object_file_name};
use crate::remote::{OfflineRemote, RemoteStore, RestClient};
use crate::suggest;
use crate::sync::{Connectivity, SyncFacade};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show whether the remote store is reachable and what is cached
  Status,
  /// List projects
  List {
    /// Filter by name or client
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    status: StatusFilter,
    /// Oldest first
    #[arg(long)]
    oldest: bool,
  },
  /// Show one project in full
  Show { id: String },
  /// Create a project
  New {
    #[arg(long)]
    name: String,
    #[arg(long)]
    client: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long)]
    phone: Option<String>,
    /// Reference shown on paperwork, e.g. DE-402-24
    #[arg(long)]
    reference: Option<String>,
    /// Mark the site as a client location
    #[arg(long)]
    client_site: bool,
    /// Look up coordinates for the address
    #[arg(long)]
    locate: bool,
  },
  /// Append a line to the field notes
  Note { id: String, text: String },
  /// Update progress and optionally the status
  Progress {
    id: String,
    percent: u8,
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    #[arg(long)]
    stage: Option<String>,
  },
  /// Delete a project
  Delete { id: String },
  /// Manage the shared material and machine presets
  Catalog {
    #[command(subcommand)]
    action: CatalogAction,
  },
  /// Current weather at a project site
  Weather { id: String },
  /// Find coordinates for an address, or the address at "lat,lng"
  Geocode { query: String },
  /// Upload a photo or document and attach it to a project
  Attach {
    id: String,
    file: PathBuf,
    /// Attach as a document instead of a photo
    #[arg(long)]
    document: bool,
  },
  /// Remove an attached photo or document and delete the stored file
  Detach { id: String, url: String },
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
  /// Print every preset
  List,
  Add {
    #[arg(value_enum)]
    kind: CatalogKind,
    name: String,
    /// Unit of measure (materials only)
    #[arg(long)]
    unit: Option<String>,
  },
  Remove {
    #[arg(value_enum)]
    kind: CatalogKind,
    id: String,
  },
  /// Autocomplete a name
  Suggest {
    #[arg(value_enum)]
    kind: CatalogKind,
    input: String,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
  Material,
  Machine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
  InProgress,
  OnHold,
  Finished,
}

impl From<StatusArg> for ProjectStatus {
  fn from(status: StatusArg) -> Self {
    match status {
      StatusArg::InProgress => ProjectStatus::InProgress,
      StatusArg::OnHold => ProjectStatus::OnHold,
      StatusArg::Finished => ProjectStatus::Finished,
    }
  }
}

/// Command-line front end over the sync layer
pub struct App {
  sync: SyncFacade<dyn RemoteStore, SqliteStorage>,
  /// Present only when a remote is configured and usable; needed for uploads
  rest: Option<RestClient>,
  http: reqwest::Client,
  config: Config,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let storage = SqliteStorage::open(&config.cache_path()?)?;
    let cache = CacheLayer::new(storage, config.cache.namespace.clone());

    let rest = match &config.remote {
      Some(remote) => match RestClient::new(remote) {
        Ok(client) => Some(client),
        Err(e) => {
          warn!(error = %e, "remote configured but unusable, working locally");
          None
        }
      },
      None => None,
    };

    let remote: Arc<dyn RemoteStore> = match &rest {
      Some(client) => Arc::new(client.clone()),
      None => Arc::new(OfflineRemote),
    };

    Self::from_parts(config, cache, remote, rest)
  }

  fn from_parts(
    config: Config,
    cache: CacheLayer<SqliteStorage>,
    remote: Arc<dyn RemoteStore>,
    rest: Option<RestClient>,
  ) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(http_timeout(&config))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      sync: SyncFacade::new(remote, cache),
      rest,
      http,
      config,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    match command {
      Command::Status => self.status().await,
      Command::List {
        search,
        status,
        oldest,
      } => {
        let sort = if oldest {
          SortOrder::Oldest
        } else {
          SortOrder::Newest
        };
        let query = ProjectQuery::new().search(search).status(status).sort(sort);
        self.list(&query).await
      }
      Command::Show { id } => {
        let project = self.require_project(&id).await?;
        print!("{}", render_project(&project));
        Ok(())
      }
      Command::New {
        name,
        client,
        address,
        phone,
        reference,
        client_site,
        locate,
      } => {
        let mut new = NewProject::named(name, client);
        new.phone = phone;
        new.custom_id = reference;
        new.is_client = client_site;
        if locate {
          new.coordinates = self.locate(&address).await;
        }
        new.address = address;

        let project = self.sync.create_project(new).await?;
        println!("created {} ({})", project.id, project.name);
        Ok(())
      }
      Command::Note { id, text } => {
        let mut project = self.require_project(&id).await?;
        append_note(&mut project.field_notes, &text);
        self.sync.save_project(project).await?;
        println!("note added to {}", id);
        Ok(())
      }
      Command::Progress {
        id,
        percent,
        status,
        stage,
      } => {
        let mut project = self.require_project(&id).await?;
        project.progress = percent.min(100);
        if let Some(status) = status {
          project.status = status.into();
        }
        if let Some(stage) = stage {
          project.current_stage = stage;
        }
        let project = self.sync.save_project(project).await?;
        println!(
          "{} is {}% done ({})",
          project.name,
          project.progress,
          project.status.label()
        );
        Ok(())
      }
      Command::Delete { id } => {
        self.sync.delete_project(&id).await?;
        println!("deleted {}", id);
        Ok(())
      }
      Command::Catalog { action } => self.catalog(action).await,
      Command::Weather { id } => self.weather(&id).await,
      Command::Geocode { query } => {
        if let Some(at) = parse_coordinates(&query) {
          match Geocoder::new(self.http.clone()).describe(at).await? {
            Some(address) => println!("{}", address),
            None => println!("no address at {}", query),
          }
        } else {
          match self.locate(&query).await {
            Some(at) => println!("{:.5}, {:.5}", at.lat, at.lng),
            None => println!("no match for {}", query),
          }
        }
        Ok(())
      }
      Command::Attach { id, file, document } => self.attach(&id, &file, document).await,
      Command::Detach { id, url } => self.detach(&id, &url).await,
    }
  }

  async fn require_project(&self, id: &str) -> Result<Project> {
    self
      .sync
      .get_project(id)
      .await?
      .ok_or_else(|| eyre!("No project with id {}", id))
  }

  async fn status(&self) -> Result<()> {
    match self.sync.connectivity().await {
      Connectivity::Online { projects } => {
        println!("remote: reachable ({} projects stored)", projects)
      }
      Connectivity::Offline => println!("remote: unreachable, working locally"),
    }

    let projects = self.sync.list_projects_with_source().await?;
    let counts = StatusCounts::of(&projects.data);
    println!(
      "projects: {} active, {} finished (from {})",
      counts.active,
      counts.finished,
      projects.source.label()
    );
    println!("cache: {}", self.config.cache_path()?.display());
    Ok(())
  }

  async fn list(&self, query: &ProjectQuery) -> Result<()> {
    let projects = self.sync.list_projects().await?;
    let matched = query.apply(&projects);

    if matched.is_empty() {
      println!("no projects");
      return Ok(());
    }

    for project in matched {
      println!(
        "{:<14} {:<28} {:<20} {:>3}%  {}",
        project.id,
        truncate(&project.name, 28),
        truncate(&project.client, 20),
        project.progress,
        project.status.label()
      );
    }
    Ok(())
  }

  async fn catalog(&self, action: CatalogAction) -> Result<()> {
    let mut catalog = self.sync.get_catalog().await?;

    match action {
      CatalogAction::List => {
        println!("materials:");
        for item in &catalog.materials {
          println!(
            "  {:>3}  {} ({})",
            item.id,
            item.name,
            item.unit.as_deref().unwrap_or("-")
          );
        }
        println!("machines:");
        for item in &catalog.machines {
          println!("  {:>3}  {}", item.id, item.name);
        }
      }
      CatalogAction::Add { kind, name, unit } => {
        let item = add_item(&mut catalog, kind, &name, unit)?;
        self.sync.save_catalog(&catalog).await?;
        println!("added {} ({})", item.name, item.id);
      }
      CatalogAction::Remove { kind, id } => {
        let list = items_mut(&mut catalog, kind);
        let before = list.len();
        list.retain(|item| item.id != id);
        if list.len() == before {
          return Err(eyre!("No catalog entry with id {}", id));
        }
        self.sync.save_catalog(&catalog).await?;
        println!("removed {}", id);
      }
      CatalogAction::Suggest { kind, input } => {
        for item in suggest::get_suggestions(items_mut(&mut catalog, kind), &input) {
          println!("{}", item.name);
        }
      }
    }

    Ok(())
  }

  async fn locate(&self, address: &str) -> Option<Coordinates> {
    match Geocoder::new(self.http.clone()).locate(address).await {
      Ok(found) => found,
      Err(e) => {
        warn!(error = %e, "address lookup failed");
        None
      }
    }
  }

  async fn weather(&self, id: &str) -> Result<()> {
    let project = self.require_project(id).await?;
    let Some(at) = project.coordinates else {
      println!("{} has no coordinates", project.name);
      return Ok(());
    };

    match WeatherClient::new(self.http.clone()).current(at).await? {
      Some(w) => println!(
        "{}: {}°C (feels {}°C), {}, wind {} km/h, humidity {}%, rain {} mm",
        project.name,
        w.temperature,
        w.feels_like,
        w.description,
        w.wind_speed,
        w.humidity,
        w.precipitation
      ),
      None => println!("{} has placeholder coordinates", project.name),
    }
    Ok(())
  }

  async fn attach(&self, id: &str, file: &Path, document: bool) -> Result<()> {
    let rest = self
      .rest
      .as_ref()
      .ok_or_else(|| eyre!("Uploads need a configured remote store"))?;
    let remote = self
      .config
      .remote
      .as_ref()
      .ok_or_else(|| eyre!("Uploads need a configured remote store"))?;

    let mut project = self.require_project(id).await?;
    let original = file
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| eyre!("Invalid file name: {}", file.display()))?;
    let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");

    let bytes = tokio::fs::read(file)
      .await
      .map_err(|e| eyre!("Failed to read {}: {}", file.display(), e))?;
    let size = bytes.len() as u64;

    let now = Utc::now();
    let object = object_file_name(now.timestamp_millis(), original);
    let bucket = if document {
      &remote.documents_bucket
    } else {
      &remote.photos_bucket
    };
    let url = rest
      .upload(bucket, &object, bytes, content_type_for(extension))
      .await?;

    if document {
      project.documents.push(DocumentItem {
        id: now.timestamp_millis().to_string(),
        name: original.to_string(),
        kind: DocumentKind::from_extension(extension),
        size: format_size(size),
        date: now.format("%Y-%m-%d").to_string(),
        url: Some(url.clone()),
      });
    } else {
      if project.image.is_empty() {
        project.image = url.clone();
      }
      project.photos.push(url.clone());
    }

    self.sync.save_project(project).await?;
    println!("attached {}", url);
    Ok(())
  }

  /// The project is saved first; the stored object is deleted best effort.
  async fn detach(&self, id: &str, url: &str) -> Result<()> {
    let mut project = self.require_project(id).await?;
    let kind =
      detach_url(&mut project, url).ok_or_else(|| eyre!("{} is not attached to {}", url, id))?;
    self.sync.save_project(project).await?;

    match (&self.rest, &self.config.remote, file_name_from_url(url)) {
      (Some(rest), Some(remote), Some(name)) => {
        let bucket = match kind {
          AttachmentKind::Photo => &remote.photos_bucket,
          AttachmentKind::Document => &remote.documents_bucket,
        };
        if let Err(e) = rest.delete_object(bucket, name).await {
          warn!(url, error = %e, "failed to delete stored object");
        }
      }
      _ => warn!(url, "no remote store, stored object left in place"),
    }

    println!("detached {}", url);
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttachmentKind {
  Photo,
  Document,
}

/// Drop every reference to `url`. A removed cover image is replaced by the
/// first remaining photo.
fn detach_url(project: &mut Project, url: &str) -> Option<AttachmentKind> {
  let documents = project.documents.len();
  project.documents.retain(|d| d.url.as_deref() != Some(url));
  if project.documents.len() != documents {
    return Some(AttachmentKind::Document);
  }

  let photos = project.photos.len();
  project.photos.retain(|p| p != url);
  let was_cover = project.image == url;
  if was_cover {
    project.image = project.photos.first().cloned().unwrap_or_default();
  }

  (was_cover || project.photos.len() != photos).then_some(AttachmentKind::Photo)
}

/// Timeout for every outbound request, taken from the remote settings.
fn http_timeout(config: &Config) -> Duration {
  let secs = match &config.remote {
    Some(remote) => remote.timeout_secs,
    None => RemoteConfig::default().timeout_secs,
  };
  Duration::from_secs(secs)
}

fn items_mut(catalog: &mut CatalogData, kind: CatalogKind) -> &mut Vec<CatalogItem> {
  match kind {
    CatalogKind::Material => &mut catalog.materials,
    CatalogKind::Machine => &mut catalog.machines,
  }
}

/// Add a preset, refusing duplicates. Machines never carry a unit.
fn add_item(
  catalog: &mut CatalogData,
  kind: CatalogKind,
  name: &str,
  unit: Option<String>,
) -> Result<CatalogItem> {
  let name = name.trim();
  if name.is_empty() {
    return Err(eyre!("Catalog entries need a name"));
  }

  let list = items_mut(catalog, kind);
  if suggest::contains_name(list.as_slice(), name) {
    return Err(eyre!("{} is already in the catalog", name));
  }

  let item = CatalogItem {
    id: CatalogData::next_id(list.as_slice()),
    name: name.to_string(),
    unit: match kind {
      CatalogKind::Material => Some(unit.unwrap_or_else(|| "buc".to_string())),
      CatalogKind::Machine => None,
    },
  };
  list.push(item.clone());
  Ok(item)
}

/// "45.64,25.59" style input.
fn parse_coordinates(input: &str) -> Option<Coordinates> {
  let (lat, lng) = input.split_once(',')?;
  let lat: f64 = lat.trim().parse().ok()?;
  let lng: f64 = lng.trim().parse().ok()?;
  let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
  in_range.then_some(Coordinates { lat, lng })
}

fn append_note(notes: &mut String, text: &str) {
  if !notes.is_empty() && !notes.ends_with('\n') {
    notes.push('\n');
  }
  notes.push_str(text.trim());
}

fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
  }
}

/// Size as shown next to documents, e.g. "2.4 MB".
fn format_size(bytes: u64) -> String {
  const KB: f64 = 1024.0;
  const MB: f64 = KB * 1024.0;

  let b = bytes as f64;
  if b >= MB {
    format!("{:.1} MB", b / MB)
  } else if b >= KB {
    format!("{:.0} KB", b / KB)
  } else {
    format!("{} B", bytes)
  }
}

fn content_type_for(extension: &str) -> &'static str {
  match extension.to_ascii_lowercase().as_str() {
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "webp" => "image/webp",
    "heic" => "image/heic",
    "pdf" => "application/pdf",
    "xls" => "application/vnd.ms-excel",
    "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "doc" => "application/msword",
    "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    _ => "application/octet-stream",
  }
}

fn render_project(project: &Project) -> String {
  let mut out = String::new();
  let mut line = |label: &str, value: &str| {
    if !value.is_empty() {
      out.push_str(&format!("{:<12} {}\n", label, value));
    }
  };

  line("id", &project.id);
  line("reference", project.custom_id.as_deref().unwrap_or(""));
  line("name", &project.name);
  line("client", &project.client);
  line("phone", project.phone.as_deref().unwrap_or(""));
  line("address", &project.address);
  line(
    "location",
    &project
      .coordinates
      .map(|c| format!("{:.5}, {:.5}", c.lat, c.lng))
      .unwrap_or_default(),
  );
  line(
    "status",
    &format!("{} ({}%)", project.status.label(), project.progress),
  );
  line("stage", &project.current_stage);
  line("area", &project.survey.area);
  line("soil", &project.survey.soil_type);
  line("topography", &project.survey.topography);

  for m in &project.logistics.materials {
    line("material", &format!("{} {} {}", m.name, m.quantity, m.unit));
  }
  for m in &project.logistics.machines {
    line("machine", &format!("{} ({:?})", m.name, m.status));
  }
  for d in &project.documents {
    line("document", &format!("{} [{}]", d.name, d.size));
  }
  line("photos", &project.photos.len().to_string());
  line("notes", &project.field_notes);

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CacheConfig;
  use crate::http_stub::{json_response, serve_once};

  fn offline_app(dir: &Path) -> App {
    let config = Config {
      cache: CacheConfig {
        path: Some(dir.join("cache.db")),
        ..CacheConfig::default()
      },
      ..Config::default()
    };
    App::new(config).unwrap()
  }

  #[test]
  fn test_http_timeout_follows_remote_settings() {
    assert_eq!(http_timeout(&Config::default()), Duration::from_secs(10));

    let config = Config {
      remote: Some(RemoteConfig {
        url: "https://db.example.com".into(),
        timeout_secs: 3,
        ..RemoteConfig::default()
      }),
      ..Config::default()
    };
    assert_eq!(http_timeout(&config), Duration::from_secs(3));
  }

  #[test]
  fn test_detach_url() {
    let mut project = NewProject::named("Gard", "Popa").into_project("7".into(), 0);
    project.photos = vec!["https://x/p/1-a.jpg".into(), "https://x/p/2-b.jpg".into()];
    project.image = "https://x/p/1-a.jpg".into();
    project.documents.push(DocumentItem {
      id: "d1".into(),
      name: "plan.pdf".into(),
      kind: DocumentKind::Pdf,
      size: "1 KB".into(),
      date: "2024-05-01".into(),
      url: Some("https://x/d/3-plan.pdf".into()),
    });

    assert_eq!(
      detach_url(&mut project, "https://x/d/3-plan.pdf"),
      Some(AttachmentKind::Document)
    );
    assert!(project.documents.is_empty());

    assert_eq!(
      detach_url(&mut project, "https://x/p/1-a.jpg"),
      Some(AttachmentKind::Photo)
    );
    assert_eq!(project.photos, vec!["https://x/p/2-b.jpg".to_string()]);
    assert_eq!(project.image, "https://x/p/2-b.jpg");

    assert_eq!(detach_url(&mut project, "https://x/p/9-z.jpg"), None);
  }

  #[tokio::test]
  async fn test_detach_deletes_stored_photo() {
    let dir = tempfile::tempdir().unwrap();
    let (url, server) = serve_once(json_response("200 OK", "[]")).await;

    let remote = RemoteConfig {
      url: url.clone(),
      ..RemoteConfig::default()
    };
    let config = Config {
      remote: Some(remote.clone()),
      cache: CacheConfig {
        path: Some(dir.path().join("cache.db")),
        ..CacheConfig::default()
      },
      ..Config::default()
    };
    let storage = SqliteStorage::open(&config.cache_path().unwrap()).unwrap();
    let rest = RestClient::with_key(&remote, "anon").unwrap();
    // Project sync stays offline so the only request is the object delete
    let app = App::from_parts(
      config,
      CacheLayer::new(storage, "test"),
      Arc::new(OfflineRemote),
      Some(rest),
    )
    .unwrap();

    let photo = format!("{}/storage/v1/object/public/photos/1700-gard.jpg", url);
    let mut new = NewProject::named("Gard", "Popa");
    new.photos = vec![photo.clone()];
    new.image = photo.clone();
    let project = app.sync.create_project(new).await.unwrap();

    app
      .run(Command::Detach {
        id: project.id.clone(),
        url: photo,
      })
      .await
      .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /storage/v1/object/photos "));
    assert!(request.contains(r#"{"prefixes":["1700-gard.jpg"]}"#));

    let project = app.sync.get_project(&project.id).await.unwrap().unwrap();
    assert!(project.photos.is_empty());
    assert_eq!(project.image, "");
  }

  #[test]
  fn test_format_size() {
    assert_eq!(format_size(900), "900 B");
    assert_eq!(format_size(512 * 1024), "512 KB");
    assert_eq!(format_size(2_516_582), "2.4 MB");
  }

  #[test]
  fn test_parse_coordinates() {
    assert_eq!(
      parse_coordinates("45.64, 25.59"),
      Some(Coordinates {
        lat: 45.64,
        lng: 25.59
      })
    );
    assert_eq!(parse_coordinates("Strada Lunga 10, Brasov"), None);
    assert_eq!(parse_coordinates("95,10"), None);
  }

  #[test]
  fn test_append_note() {
    let mut notes = String::new();
    append_note(&mut notes, " first ");
    append_note(&mut notes, "second");
    assert_eq!(notes, "first\nsecond");
  }

  #[test]
  fn test_truncate() {
    assert_eq!(truncate("Gard", 10), "Gard");
    assert_eq!(truncate("Fierăstrău circular", 6), "Fieră…");
  }

  #[test]
  fn test_add_item_rejects_duplicates() {
    let mut catalog = CatalogData::default_presets();
    let item = add_item(&mut catalog, CatalogKind::Material, "Pamant", None).unwrap();
    assert_eq!(item.id, "21");
    assert_eq!(item.unit.as_deref(), Some("buc"));

    let unit = Some("x".to_string());
    let machine = add_item(&mut catalog, CatalogKind::Machine, "Cilindru", unit).unwrap();
    assert_eq!(machine.unit, None);

    assert!(add_item(&mut catalog, CatalogKind::Material, "ciment", None).is_err());
    assert!(add_item(&mut catalog, CatalogKind::Machine, "  ", None).is_err());
  }

  #[test]
  fn test_render_project_skips_empty_fields() {
    let mut project = NewProject::named("Gard", "Popa").into_project("7".into(), 0);
    project.field_notes = "Stalpi noi".into();
    let rendered = render_project(&project);
    assert!(rendered.contains("name         Gard"));
    assert!(rendered.contains("notes        Stalpi noi"));
    assert!(!rendered.contains("phone"));
  }

  #[tokio::test]
  async fn test_offline_commands_update_local_cache() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());

    app
      .run(Command::New {
        name: "Gradina".into(),
        client: "Ana".into(),
        address: String::new(),
        phone: None,
        reference: Some("DE-1".into()),
        client_site: true,
        locate: false,
      })
      .await
      .unwrap();

    let projects = app.sync.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    let id = projects[0].id.clone();

    app
      .run(Command::Note {
        id: id.clone(),
        text: "Sol argilos".into(),
      })
      .await
      .unwrap();
    app
      .run(Command::Progress {
        id: id.clone(),
        percent: 150,
        status: Some(StatusArg::Finished),
        stage: None,
      })
      .await
      .unwrap();

    let project = app.sync.get_project(&id).await.unwrap().unwrap();
    assert_eq!(project.field_notes, "Sol argilos");
    assert_eq!(project.progress, 100);
    assert_eq!(project.status, ProjectStatus::Finished);
    assert_eq!(project.custom_id.as_deref(), Some("DE-1"));
    assert!(project.is_client);

    app.run(Command::Delete { id: id.clone() }).await.unwrap();
    assert!(app.run(Command::Show { id }).await.is_err());
  }

  #[tokio::test]
  async fn test_catalog_commands() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());

    app
      .run(Command::Catalog {
        action: CatalogAction::Add {
          kind: CatalogKind::Material,
          name: "Pamant vegetal".into(),
          unit: Some("mc".into()),
        },
      })
      .await
      .unwrap();
    app
      .run(Command::Catalog {
        action: CatalogAction::Remove {
          kind: CatalogKind::Machine,
          id: "1".into(),
        },
      })
      .await
      .unwrap();

    let catalog = app.sync.get_catalog().await.unwrap();
    assert_eq!(catalog.materials.len(), 21);
    assert_eq!(catalog.machines.len(), 15);
    assert!(catalog.machines.iter().all(|m| m.id != "1"));

    let missing = app
      .run(Command::Catalog {
        action: CatalogAction::Remove {
          kind: CatalogKind::Machine,
          id: "1".into(),
        },
      })
      .await;
    assert!(missing.is_err());
  }

  #[tokio::test]
  async fn test_attach_needs_remote() {
    let dir = tempfile::tempdir().unwrap();
    let app = offline_app(dir.path());
    let err = app
      .run(Command::Attach {
        id: "1".into(),
        file: dir.path().join("poza.jpg"),
        document: false,
      })
      .await
      .unwrap_err();
    assert!(err.to_string().contains("remote"));
  }
}
