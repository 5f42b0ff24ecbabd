//! County and district reference data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A county.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct County {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
}

/// A district within a county.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct District {
    pub id: Uuid,
    pub county_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCountiesResponse {
    pub data: Vec<County>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDistrictsResponse {
    pub data: Vec<District>,
}
