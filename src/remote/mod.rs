//! Hosted database and object storage.

pub mod api_types;
pub mod client;
pub mod store;

pub use api_types::{CatalogRow, ProjectRow};
pub use client::RestClient;
pub use store::{OfflineRemote, RemoteStore};
