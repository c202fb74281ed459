//! Serde types matching the rows stored in the remote tables.
//!
//! These types are separate from domain types: columns are snake_case, the
//! logistics record is split into two columns and timestamps are RFC 3339
//! strings rather than epoch milliseconds.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{
  CatalogData, CatalogItem, Coordinates, DocumentItem, Logistics, MachineItem, MaterialItem,
  Project, ProjectStatus, SurveyData, CATALOG_ID,
};

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
  pub id: String,
  #[serde(default)]
  pub custom_id: Option<String>,
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub client: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub address: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub is_client: bool,
  #[serde(default)]
  pub coordinates: Option<Coordinates>,
  pub status: ProjectStatus,
  #[serde(default, deserialize_with = "null_as_default")]
  pub progress: u8,
  #[serde(default, deserialize_with = "null_as_default")]
  pub current_stage: String,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub photos: Option<Vec<String>>,
  #[serde(default)]
  pub survey: Option<SurveyData>,
  #[serde(default)]
  pub logistics_materials: Option<Vec<MaterialItem>>,
  #[serde(default)]
  pub logistics_machines: Option<Vec<MachineItem>>,
  #[serde(default)]
  pub documents: Option<Vec<DocumentItem>>,
  #[serde(default)]
  pub field_notes: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl ProjectRow {
  pub fn from_project(project: &Project) -> Result<Self> {
    Ok(Self {
      id: project.id.clone(),
      custom_id: project.custom_id.clone(),
      name: project.name.clone(),
      client: project.client.clone(),
      phone: project.phone.clone(),
      address: project.address.clone(),
      is_client: project.is_client,
      coordinates: project.coordinates,
      status: project.status,
      progress: project.progress,
      current_stage: project.current_stage.clone(),
      image: Some(project.image.clone()),
      photos: Some(project.photos.clone()),
      survey: Some(project.survey.clone()),
      logistics_materials: Some(project.logistics.materials.clone()),
      logistics_machines: Some(project.logistics.machines.clone()),
      documents: Some(project.documents.clone()),
      field_notes: Some(project.field_notes.clone()),
      created_at: millis_to_rfc3339(project.created_at)?,
      updated_at: millis_to_rfc3339(project.updated_at)?,
    })
  }

  /// Convert back to the domain shape. Null list columns become empty lists.
  pub fn into_project(self) -> Result<Project> {
    let created_at = rfc3339_to_millis(&self.created_at)?;
    let updated_at = rfc3339_to_millis(&self.updated_at)?;

    Ok(Project {
      id: self.id,
      custom_id: self.custom_id,
      name: self.name,
      client: self.client,
      phone: self.phone,
      address: self.address,
      is_client: self.is_client,
      coordinates: self.coordinates,
      status: self.status,
      progress: self.progress,
      current_stage: self.current_stage,
      image: self.image.unwrap_or_default(),
      photos: self.photos.unwrap_or_default(),
      survey: self.survey.unwrap_or_default(),
      logistics: Logistics {
        materials: self.logistics_materials.unwrap_or_default(),
        machines: self.logistics_machines.unwrap_or_default(),
      },
      documents: self.documents.unwrap_or_default(),
      field_notes: self.field_notes.unwrap_or_default(),
      created_at,
      updated_at,
    })
  }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
  pub id: String,
  #[serde(default)]
  pub materials: Option<Vec<CatalogItem>>,
  #[serde(default)]
  pub machines: Option<Vec<CatalogItem>>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

impl CatalogRow {
  /// The singleton row for a catalog, stamped with the write time.
  pub fn from_catalog(catalog: &CatalogData, now_millis: i64) -> Result<Self> {
    Ok(Self {
      id: CATALOG_ID.to_string(),
      materials: Some(catalog.materials.clone()),
      machines: Some(catalog.machines.clone()),
      updated_at: Some(millis_to_rfc3339(now_millis)?),
    })
  }

  pub fn into_catalog(self) -> CatalogData {
    CatalogData {
      materials: self.materials.unwrap_or_default(),
      machines: self.machines.unwrap_or_default(),
    }
  }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Format epoch milliseconds the way the remote stores timestamps.
pub fn millis_to_rfc3339(millis: i64) -> Result<String> {
  let dt = Utc
    .timestamp_millis_opt(millis)
    .single()
    .ok_or_else(|| eyre!("Timestamp out of range: {}", millis))?;
  Ok(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn rfc3339_to_millis(value: &str) -> Result<i64> {
  DateTime::parse_from_rfc3339(value)
    .map(|dt| dt.timestamp_millis())
    .map_err(|e| eyre!("Failed to parse timestamp '{}': {}", value, e))
}

/// Treat a null column like a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
