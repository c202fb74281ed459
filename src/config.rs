use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Hosted database; when absent everything stays local
  pub remote: Option<RemoteConfig>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
  /// Base URL of the service (e.g., "https://abc.supabase.co")
  pub url: String,
  pub projects_table: String,
  pub catalog_table: String,
  /// Bucket for project photos
  pub photos_bucket: String,
  /// Bucket for attached documents
  pub documents_bucket: String,
  pub timeout_secs: u64,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      url: String::new(),
      projects_table: "projects".to_string(),
      catalog_table: "catalog".to_string(),
      photos_bucket: "photos".to_string(),
      documents_bucket: "documents".to_string(),
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Database file (defaults to the platform data directory)
  pub path: Option<PathBuf>,
  /// Prefix separating this dataset from others in the same file
  pub namespace: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      path: None,
      namespace: "sitebook".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Default filter directive, overridden by RUST_LOG
  pub level: String,
  /// Directory for log files (defaults to the platform data directory)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./sitebook.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/sitebook/config.yaml
  ///
  /// With no file at all the defaults are used, which means offline mode.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("sitebook.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("sitebook").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;

    if let Some(remote) = &config.remote {
      if remote.url.trim().is_empty() {
        return Err(eyre!("remote.url must not be empty"));
      }
    }

    Ok(config)
  }

  /// Get the remote API key from environment variables.
  ///
  /// Checks SITEBOOK_REMOTE_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("SITEBOOK_REMOTE_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!(concat!(
          "Remote API key not found. ",
          "Set SITEBOOK_REMOTE_KEY or SUPABASE_ANON_KEY environment variable."
        ))
      })
  }

  /// Where the local cache database lives.
  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(path) => Ok(path.clone()),
      None => crate::cache::SqliteStorage::default_path(),
    }
  }
}
