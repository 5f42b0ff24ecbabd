//! County and district lookups.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CountyEntity, DistrictEntity};
use crate::metrics::QueryTimer;

/// Repository for region reference data.
#[derive(Clone)]
pub struct RegionRepository {
    pool: PgPool,
}

impl RegionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all counties by name.
    pub async fn list_counties(&self) -> Result<Vec<CountyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_counties");
        let result = sqlx::query_as::<_, CountyEntity>(
            "SELECT id, name, code FROM counties ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn county_exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_county_exists");
        let result =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM counties WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// List the districts of a county by name.
    pub async fn list_districts(&self, county_id: Uuid) -> Result<Vec<DistrictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_districts");
        let result = sqlx::query_as::<_, DistrictEntity>(
            r#"
            SELECT id, county_id, name
            FROM districts
            WHERE county_id = $1
            ORDER BY name
            "#,
        )
        .bind(county_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
