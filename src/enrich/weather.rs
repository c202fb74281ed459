//! Current conditions at a site, from Open-Meteo.

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use tracing::debug;

use crate::model::Coordinates;

const DEFAULT_BASE: &str = "https://api.open-meteo.com/";

/// Coordinates a new project gets before a real location is set.
const PLACEHOLDER: Coordinates = Coordinates {
  lat: 52.52,
  lng: 13.40,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
  /// Degrees Celsius, rounded
  pub temperature: i32,
  pub feels_like: i32,
  pub description: &'static str,
  pub icon: &'static str,
  /// km/h
  pub wind_speed: i32,
  /// Percent
  pub humidity: u8,
  /// mm
  pub precipitation: i32,
  /// hPa
  pub pressure: i32,
  pub cloud_cover: u8,
  pub uv_index: f64,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
  current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
  temperature_2m: f64,
  relative_humidity_2m: f64,
  precipitation: f64,
  weather_code: u16,
  wind_speed_10m: f64,
  apparent_temperature: f64,
  pressure_msl: f64,
  cloud_cover: f64,
  #[serde(default)]
  uv_index: f64,
}

impl From<ApiCurrent> for Weather {
  fn from(current: ApiCurrent) -> Self {
    let (description, icon) = describe(current.weather_code);
    Self {
      temperature: current.temperature_2m.round() as i32,
      feels_like: current.apparent_temperature.round() as i32,
      description,
      icon,
      wind_speed: current.wind_speed_10m.round() as i32,
      humidity: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
      precipitation: current.precipitation.round() as i32,
      pressure: current.pressure_msl.round() as i32,
      cloud_cover: current.cloud_cover.round().clamp(0.0, 100.0) as u8,
      uv_index: current.uv_index,
    }
  }
}

/// Description and icon name for a WMO weather code.
fn describe(code: u16) -> (&'static str, &'static str) {
  match code {
    0 => ("Clear", "sun"),
    1 => ("Mostly clear", "sun"),
    2 => ("Partly cloudy", "partlyCloudy"),
    3 => ("Overcast", "cloud"),
    45 | 48 => ("Fog", "fog"),
    51..=55 => ("Drizzle", "drizzle"),
    56 | 57 => ("Freezing drizzle", "drizzle"),
    61..=65 => ("Rain", "rain"),
    66 | 67 => ("Freezing rain", "rain"),
    71..=77 => ("Snow", "snow"),
    80..=82 => ("Rain showers", "rain"),
    85 | 86 => ("Snow showers", "snow"),
    95.. => ("Thunderstorm", "storm"),
    _ => ("Cloudy", "cloud"),
  }
}

#[derive(Clone)]
pub struct WeatherClient {
  http: reqwest::Client,
  base: String,
}

impl WeatherClient {
  pub fn new(http: reqwest::Client) -> Self {
    Self::with_base(http, DEFAULT_BASE)
  }

  pub fn with_base(http: reqwest::Client, base: impl Into<String>) -> Self {
    Self {
      http,
      base: base.into(),
    }
  }

  /// Current weather at the coordinates.
  ///
  /// Returns `None` for the placeholder location, which is not a real site.
  pub async fn current(&self, at: Coordinates) -> Result<Option<Weather>> {
    if at == PLACEHOLDER {
      debug!("placeholder coordinates, skipping weather lookup");
      return Ok(None);
    }

    let url = format!("{}v1/forecast", self.base);
    let forecast: ApiForecast = self
      .http
      .get(url)
      .query(&[
        ("latitude", at.lat.to_string()),
        ("longitude", at.lng.to_string()),
        (
          "current",
          "temperature_2m,relative_humidity_2m,precipitation,weather_code,wind_speed_10m,\
           apparent_temperature,pressure_msl,cloud_cover,uv_index"
            .to_string(),
        ),
      ])
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| eyre!("Failed to fetch weather: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse weather: {}", e))?;

    Ok(Some(forecast.current.into()))
  }
}
