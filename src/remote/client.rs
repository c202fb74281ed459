use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, RemoteConfig};

use super::api_types::{CatalogRow, ProjectRow};
use super::store::RemoteStore;

/// Client for a PostgREST database with a storage API beside it
#[derive(Clone)]
pub struct RestClient {
  http: reqwest::Client,
  base: Url,
  projects_table: String,
  catalog_table: String,
}

impl RestClient {
  pub fn new(config: &RemoteConfig) -> Result<Self> {
    let key = Config::get_api_key()?;
    Self::with_key(config, &key)
  }

  pub fn with_key(config: &RemoteConfig, key: &str) -> Result<Self> {
    let mut base = config.url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }
    let base = Url::parse(&base).map_err(|e| eyre!("Invalid remote url {}: {}", config.url, e))?;

    let mut headers = HeaderMap::new();
    let api_key =
      HeaderValue::from_str(key).map_err(|e| eyre!("Remote API key is not a valid header: {}", e))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
      .map_err(|e| eyre!("Remote API key is not a valid header: {}", e))?;
    headers.insert("apikey", api_key);
    headers.insert(AUTHORIZATION, bearer);

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      projects_table: config.projects_table.clone(),
      catalog_table: config.catalog_table.clone(),
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }

  fn table(&self, table: &str) -> Result<Url> {
    self.endpoint(&format!("rest/v1/{}", table))
  }

  /// Send a request and turn non-2xx statuses into errors carrying the body.
  async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
    let response = request
      .send()
      .await
      .map_err(|e| eyre!("Failed to {}: {}", what, e))?;

    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(eyre!("Failed to {}: HTTP {} {}", what, status, body))
  }

  // ==========================================================================
  // Object storage
  // ==========================================================================

  /// Public URL under which an uploaded object is served.
  pub fn public_url(&self, bucket: &str, file_name: &str) -> Result<String> {
    Ok(
      self
        .endpoint(&format!("storage/v1/object/public/{}/{}", bucket, file_name))?
        .to_string(),
    )
  }

  /// Upload bytes to a bucket and return their public URL.
  ///
  /// Existing objects are never overwritten.
  pub async fn upload(
    &self,
    bucket: &str,
    file_name: &str,
    bytes: Vec<u8>,
    content_type: &str,
  ) -> Result<String> {
    debug!(bucket, file_name, size = bytes.len(), "uploading object");
    let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, file_name))?;

    let request = self
      .http
      .post(url)
      .header(CONTENT_TYPE, content_type)
      .header("cache-control", "3600")
      .header("x-upsert", "false")
      .body(bytes);
    self.send(request, "upload object").await?;

    self.public_url(bucket, file_name)
  }

  /// Remove an object from a bucket.
  pub async fn delete_object(&self, bucket: &str, file_name: &str) -> Result<()> {
    let url = self.endpoint(&format!("storage/v1/object/{}", bucket))?;
    let body = serde_json::json!({ "prefixes": [file_name] });

    self
      .send(self.http.delete(url).json(&body), "delete object")
      .await?;
    Ok(())
  }
}

#[async_trait]
impl RemoteStore for RestClient {
  async fn count_projects(&self) -> Result<u64> {
    let url = self.table(&self.projects_table)?;
    let request = self
      .http
      .head(url)
      .query(&[("select", "*")])
      .header("Prefer", "count=exact");

    let response = self.send(request, "count projects").await?;
    let range = response
      .headers()
      .get("content-range")
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| eyre!("Count response has no Content-Range header"))?;

    parse_content_range_total(range)
      .ok_or_else(|| eyre!("Unexpected Content-Range header: {}", range))
  }

  async fn fetch_projects(&self) -> Result<Vec<ProjectRow>> {
    let url = self.table(&self.projects_table)?;
    let request = self
      .http
      .get(url)
      .query(&[("select", "*"), ("order", "created_at.desc")]);

    let values: Vec<Value> = self
      .send(request, "fetch projects")
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse projects: {}", e))?;

    // One malformed row must not hide the others
    let rows = values
      .into_iter()
      .filter_map(|value| {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<ProjectRow>(value) {
          Ok(row) => Some(row),
          Err(e) => {
            warn!(id = %id, error = %e, "skipping malformed project row");
            None
          }
        }
      })
      .collect();

    Ok(rows)
  }

  async fn upsert_project(&self, row: &ProjectRow) -> Result<()> {
    let url = self.table(&self.projects_table)?;
    let request = self
      .http
      .post(url)
      .query(&[("on_conflict", "id")])
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(row);

    self.send(request, "upsert project").await?;
    Ok(())
  }

  async fn delete_project(&self, id: &str) -> Result<()> {
    let url = self.table(&self.projects_table)?;
    let filter = format!("eq.{}", id);
    let request = self.http.delete(url).query(&[("id", filter.as_str())]);

    self.send(request, "delete project").await?;
    Ok(())
  }

  async fn fetch_catalog(&self) -> Result<Option<CatalogRow>> {
    let url = self.table(&self.catalog_table)?;
    let filter = format!("eq.{}", crate::model::CATALOG_ID);
    let request = self
      .http
      .get(url)
      .query(&[("select", "*"), ("id", filter.as_str())]);

    let rows: Vec<CatalogRow> = self
      .send(request, "fetch catalog")
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse catalog: {}", e))?;

    Ok(rows.into_iter().next())
  }

  async fn upsert_catalog(&self, row: &CatalogRow) -> Result<()> {
    let url = self.table(&self.catalog_table)?;
    let request = self
      .http
      .post(url)
      .query(&[("on_conflict", "id")])
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(row);

    self.send(request, "upsert catalog").await?;
    Ok(())
  }
}

/// Total from a `Content-Range` header such as `0-24/312` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
  let (_, total) = value.rsplit_once('/')?;
  total.trim().parse().ok()
}

/// Object name for an upload: a millisecond prefix keeps names unique, and
/// whitespace is replaced so the name is URL friendly.
pub fn object_file_name(now_millis: i64, original: &str) -> String {
  let cleaned: String = original
    .chars()
    .map(|c| if c.is_whitespace() { '-' } else { c })
    .collect();
  format!("{}-{}", now_millis, cleaned)
}

/// The object name inside a public URL (its last path segment).
pub fn file_name_from_url(url: &str) -> Option<&str> {
  url.rsplit('/').next().filter(|name| !name.is_empty())
}
