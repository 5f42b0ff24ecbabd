//! County and district entities.

use domain::models::{County, District};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the counties table.
#[derive(Debug, Clone, FromRow)]
pub struct CountyEntity {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
}

impl From<CountyEntity> for County {
    fn from(entity: CountyEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            code: entity.code,
        }
    }
}

/// Database row mapping for the districts table.
#[derive(Debug, Clone, FromRow)]
pub struct DistrictEntity {
    pub id: Uuid,
    pub county_id: Uuid,
    pub name: String,
}

impl From<DistrictEntity> for District {
    fn from(entity: DistrictEntity) -> Self {
        Self {
            id: entity.id,
            county_id: entity.county_id,
            name: entity.name,
        }
    }
}
