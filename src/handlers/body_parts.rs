use axum::{response::IntoResponse, Json};

use crate::catalog::CatalogError;
use crate::database::manager::DatabaseManager;
use crate::database::repository::taxonomies;
use crate::error::ApiError;

/// GET /api/v1/workouts/body-parts - List the shared body part taxonomy
pub async fn list() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let body_parts = taxonomies::list_body_parts(&pool).await.map_err(CatalogError::from)?;
    Ok(Json(body_parts))
}
