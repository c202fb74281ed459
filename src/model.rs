//! Domain records for projects and the shared catalog.
//!
//! These are plain data. The cache stores them as camelCase JSON; the
//! remote row shapes live in `remote::api_types`.

use serde::{Deserialize, Serialize};

/// Key of the catalog singleton, both locally and remotely.
pub const CATALOG_ID: &str = "default";

/// Lifecycle state of a project site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
  #[serde(rename = "În Lucru", alias = "in_progress")]
  InProgress,
  #[serde(rename = "În Așteptare", alias = "on_hold")]
  OnHold,
  #[serde(rename = "Finalizat", alias = "finished")]
  Finished,
}

impl ProjectStatus {
  /// Work that is not finished yet, whether running or paused.
  pub fn is_active(self) -> bool {
    matches!(self, ProjectStatus::InProgress | ProjectStatus::OnHold)
  }

  pub fn label(self) -> &'static str {
    match self {
      ProjectStatus::InProgress => "in progress",
      ProjectStatus::OnHold => "on hold",
      ProjectStatus::Finished => "finished",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
  #[serde(rename = "Activ", alias = "active")]
  Active,
  #[serde(rename = "Reparație", alias = "in_repair")]
  InRepair,
  #[serde(rename = "Inactiv", alias = "inactive")]
  Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
  Pdf,
  Dwg,
  Doc,
  Xls,
}

impl DocumentKind {
  /// Guess the kind from a file extension, defaulting to a generic document.
  pub fn from_extension(ext: &str) -> Self {
    match ext.to_ascii_lowercase().as_str() {
      "pdf" => DocumentKind::Pdf,
      "dwg" | "dxf" => DocumentKind::Dwg,
      "xls" | "xlsx" | "csv" => DocumentKind::Xls,
      _ => DocumentKind::Doc,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
  pub id: String,
  pub name: String,
  /// Never negative
  pub quantity: f64,
  pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineItem {
  pub id: String,
  pub name: String,
  pub status: MachineStatus,
}

/// A file attached to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: DocumentKind,
  /// Human readable, e.g. "2.4 MB"
  pub size: String,
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vegetation {
  pub trees: bool,
  pub shrubs: bool,
  pub grass: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacles {
  pub rocks: bool,
  pub fences: bool,
  pub water: bool,
}

/// Site survey. Measurements are kept as entered, so they are strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
  pub area: String,
  pub perimeter: String,
  pub slope: String,
  pub length: String,
  pub width: String,
  pub soil_type: String,
  pub topography: String,
  pub vegetation: Vegetation,
  pub obstacles: Obstacles,
  pub notes: String,
}

impl Default for SurveyData {
  fn default() -> Self {
    Self {
      area: String::new(),
      perimeter: String::new(),
      slope: String::new(),
      length: String::new(),
      width: String::new(),
      soil_type: String::new(),
      topography: "flat".to_string(),
      vegetation: Vegetation::default(),
      obstacles: Obstacles::default(),
      notes: String::new(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logistics {
  pub materials: Vec<MaterialItem>,
  pub machines: Vec<MachineItem>,
}

/// A tracked site. Each project is a standalone aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub custom_id: Option<String>,
  pub name: String,
  pub client: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  pub address: String,
  #[serde(default)]
  pub is_client: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub coordinates: Option<Coordinates>,
  pub status: ProjectStatus,
  /// Percent complete, 0-100
  pub progress: u8,
  pub current_stage: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub photos: Vec<String>,
  #[serde(default)]
  pub survey: SurveyData,
  #[serde(default)]
  pub logistics: Logistics,
  #[serde(default)]
  pub documents: Vec<DocumentItem>,
  #[serde(default)]
  pub field_notes: String,
  /// Milliseconds since the epoch
  pub created_at: i64,
  pub updated_at: i64,
}

/// Everything a caller supplies when creating a project; identity and
/// timestamps are assigned on creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
  pub custom_id: Option<String>,
  pub name: String,
  pub client: String,
  pub phone: Option<String>,
  pub address: String,
  pub is_client: bool,
  pub coordinates: Option<Coordinates>,
  pub status: ProjectStatus,
  pub progress: u8,
  pub current_stage: String,
  pub image: String,
  pub photos: Vec<String>,
  pub survey: SurveyData,
  pub logistics: Logistics,
  pub documents: Vec<DocumentItem>,
  pub field_notes: String,
}

impl NewProject {
  /// A fresh in-progress project with an empty survey.
  pub fn named(name: impl Into<String>, client: impl Into<String>) -> Self {
    Self {
      custom_id: None,
      name: name.into(),
      client: client.into(),
      phone: None,
      address: String::new(),
      is_client: false,
      coordinates: None,
      status: ProjectStatus::InProgress,
      progress: 0,
      current_stage: String::new(),
      image: String::new(),
      photos: Vec::new(),
      survey: SurveyData::default(),
      logistics: Logistics::default(),
      documents: Vec::new(),
      field_notes: String::new(),
    }
  }

  pub(crate) fn into_project(self, id: String, now: i64) -> Project {
    Project {
      id,
      custom_id: self.custom_id,
      name: self.name,
      client: self.client,
      phone: self.phone,
      address: self.address,
      is_client: self.is_client,
      coordinates: self.coordinates,
      status: self.status,
      progress: self.progress.min(100),
      current_stage: self.current_stage,
      image: self.image,
      photos: self.photos,
      survey: self.survey,
      logistics: self.logistics,
      documents: self.documents,
      field_notes: self.field_notes,
      created_at: now,
      updated_at: now,
    }
  }
}

/// A catalog preset. Only materials carry a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
}

/// Global autocomplete presets, shared by all projects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogData {
  #[serde(default)]
  pub materials: Vec<CatalogItem>,
  #[serde(default)]
  pub machines: Vec<CatalogItem>,
}

impl CatalogData {
  /// The presets a fresh install starts with.
  pub fn default_presets() -> Self {
    const MATERIALS: &[(&str, &str)] = &[
      ("Ciment", "saci"),
      ("Nisip", "mc"),
      ("Pietriș", "mc"),
      ("Beton", "mc"),
      ("Oțel beton", "kg"),
      ("Cherestea", "mc"),
      ("Pal", "buc"),
      ("Șuruburi", "cutii"),
      ("Cuie", "kg"),
      ("Vopsea", "l"),
      ("Grund", "l"),
      ("Diluant", "l"),
      ("Gips", "saci"),
      ("Hidroizolație", "role"),
      ("Folie PVC", "mp"),
      ("Țeavă PVC", "buc"),
      ("Fitinguri PVC", "buc"),
      ("Căldare", "buc"),
      ("Găleți", "buc"),
      ("Mănuși", "perechi"),
    ];
    const MACHINES: &[&str] = &[
      "Betonieră",
      "Fierăstrău circular",
      "Fierăstrău pendular",
      "Mașină de găurit",
      "Șlefuitor",
      "Flex",
      "Generator",
      "Compresor",
      "Pompe de beton",
      "Excavator",
      "Încărcător frontal",
      "Autobetonieră",
      "Basculantă",
      "Platformă",
      "Motocoasă",
      "Freză de zăpadă",
    ];

    Self {
      materials: MATERIALS
        .iter()
        .enumerate()
        .map(|(i, (name, unit))| CatalogItem {
          id: (i + 1).to_string(),
          name: name.to_string(),
          unit: Some(unit.to_string()),
        })
        .collect(),
      machines: MACHINES
        .iter()
        .enumerate()
        .map(|(i, name)| CatalogItem {
          id: (i + 1).to_string(),
          name: name.to_string(),
          unit: None,
        })
        .collect(),
    }
  }

  /// Next free numeric id within a list.
  pub fn next_id(items: &[CatalogItem]) -> String {
    let max = items
      .iter()
      .filter_map(|item| item.id.parse::<u64>().ok())
      .max()
      .unwrap_or(0);
    (max + 1).to_string()
  }
}
