//! Best-effort lookups against public HTTP APIs. No retries.

mod geocode;
mod weather;

pub use geocode::Geocoder;
pub use weather::{Weather, WeatherClient};
