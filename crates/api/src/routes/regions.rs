//! County and district lookups used by the team registration forms.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::region::{ListCountiesResponse, ListDistrictsResponse};
use persistence::repositories::RegionRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/v1/counties
pub async fn list_counties(
    State(state): State<AppState>,
) -> Result<Json<ListCountiesResponse>, ApiError> {
    let repo = RegionRepository::new(state.pool.clone());
    let counties = repo.list_counties().await?;

    Ok(Json(ListCountiesResponse {
        data: counties.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/counties/:county_id/districts
pub async fn list_districts(
    State(state): State<AppState>,
    Path(county_id): Path<Uuid>,
) -> Result<Json<ListDistrictsResponse>, ApiError> {
    let repo = RegionRepository::new(state.pool.clone());

    if !repo.county_exists(county_id).await? {
        return Err(ApiError::NotFound("County not found".to_string()));
    }

    let districts = repo.list_districts(county_id).await?;
    Ok(Json(ListDistrictsResponse {
        data: districts.into_iter().map(Into::into).collect(),
    }))
}
