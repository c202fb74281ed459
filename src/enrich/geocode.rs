//! Address lookups: Open-Meteo for forward search, Nominatim for reverse.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;

use crate::model::Coordinates;

const SEARCH_BASE: &str = "https://geocoding-api.open-meteo.com/";
const REVERSE_BASE: &str = "https://nominatim.openstreetmap.org/";

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
  #[serde(default)]
  results: Vec<ApiPlace>,
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
  latitude: f64,
  longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ApiReverse {
  display_name: Option<String>,
}

#[derive(Clone)]
pub struct Geocoder {
  http: reqwest::Client,
  search_base: String,
  reverse_base: String,
}

impl Geocoder {
  pub fn new(http: reqwest::Client) -> Self {
    Self::with_bases(http, SEARCH_BASE, REVERSE_BASE)
  }

  pub fn with_bases(
    http: reqwest::Client,
    search_base: impl Into<String>,
    reverse_base: impl Into<String>,
  ) -> Self {
    Self {
      http,
      search_base: search_base.into(),
      reverse_base: reverse_base.into(),
    }
  }

  /// Coordinates of the best match for a free-text address.
  pub async fn locate(&self, address: &str) -> Result<Option<Coordinates>> {
    let address = address.trim();
    if address.is_empty() {
      return Ok(None);
    }

    let url = format!("{}v1/search", self.search_base);
    let response: ApiSearchResponse = self
      .http
      .get(url)
      .query(&[
        ("name", address),
        ("count", "1"),
        ("language", "en"),
        ("format", "json"),
      ])
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("Failed to search address: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse address search: {}", e))?;

    Ok(response.results.into_iter().next().map(|place| Coordinates {
      lat: place.latitude,
      lng: place.longitude,
    }))
  }

  /// Human readable address for a position.
  pub async fn describe(&self, at: Coordinates) -> Result<Option<String>> {
    let url = format!("{}reverse", self.reverse_base);
    let response: ApiReverse = self
      .http
      .get(url)
      // Nominatim rejects anonymous clients
      .header(
        reqwest::header::USER_AGENT,
        concat!("sitebook/", env!("CARGO_PKG_VERSION")),
      )
      .query(&[
        ("format", "json".to_string()),
        ("lat", at.lat.to_string()),
        ("lon", at.lng.to_string()),
        ("addressdetails", "1".to_string()),
      ])
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("Failed to look up address: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse address lookup: {}", e))?;

    Ok(response.display_name.filter(|name| !name.is_empty()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http_stub::{json_response, serve_once};

  #[tokio::test]
  async fn test_locate_takes_first_result() {
    let body = r#"{"results":[{"name":"Brasov","latitude":45.6486,"longitude":25.6061},
      {"name":"Brasov County","latitude":45.75,"longitude":25.33}]}"#;
    let (url, server) = serve_once(json_response("200 OK", body)).await;
    let geocoder = Geocoder::with_bases(reqwest::Client::new(), format!("{}/", url), "unused");

    let found = geocoder.locate("Brasov").await.unwrap();
    assert_eq!(
      found,
      Some(Coordinates {
        lat: 45.6486,
        lng: 25.6061
      })
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v1/search?name=Brasov&count=1"));
  }

  #[tokio::test]
  async fn test_locate_without_results() {
    let (url, _server) = serve_once(json_response("200 OK", "{}")).await;
    let geocoder = Geocoder::with_bases(reqwest::Client::new(), format!("{}/", url), "unused");
    assert_eq!(geocoder.locate("Atlantis").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_blank_address_is_not_sent() {
    let geocoder = Geocoder::with_bases(reqwest::Client::new(), "http://127.0.0.1:9/", "unused");
    assert_eq!(geocoder.locate("   ").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_describe_sends_user_agent() {
    let body = r#"{"display_name":"Strada Lunga 10, Brasov, Romania","address":{}}"#;
    let (url, server) = serve_once(json_response("200 OK", body)).await;
    let geocoder = Geocoder::with_bases(reqwest::Client::new(), "unused", format!("{}/", url));

    let name = geocoder
      .describe(Coordinates {
        lat: 45.64,
        lng: 25.59,
      })
      .await
      .unwrap();
    assert_eq!(name.as_deref(), Some("Strada Lunga 10, Brasov, Romania"));

    let request = server.await.unwrap().to_lowercase();
    assert!(request.contains("user-agent: sitebook/"));
    assert!(request.contains("lat=45.64&lon=25.59"));
  }
}
