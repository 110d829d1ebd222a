use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{page_request, sort_spec};
use crate::catalog::{CatalogError, Visibility};
use crate::database::manager::DatabaseManager;
use crate::database::repository::taxonomies;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::nutrition_service::{
    NutritionCreateRequest, NutritionListParams, NutritionService, NutritionUpdateRequest,
};
use crate::validation;

const DEFAULT_SORT: &str = "title";

#[derive(Debug, Deserialize)]
pub struct NutritionListQuery {
    pub is_custom: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub nutrition_type_id: Option<Uuid>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
}

impl NutritionListQuery {
    fn into_params(self, user_id: Option<Uuid>, is_custom: Option<bool>) -> Result<NutritionListParams, ApiError> {
        Ok(NutritionListParams {
            is_custom,
            user_id,
            title: self.title,
            description: self.description,
            nutrition_type_id: self.nutrition_type_id,
            sort: sort_spec(self.sort_field, self.sort_direction, DEFAULT_SORT)?,
            page: page_request(self.page_number, self.page_size)?,
        })
    }
}

/// POST /api/v1/nutritions - Create a custom nutrition item
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NutritionCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_title("title", &payload.title),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = NutritionService::new().await?;
    let response = service.create_custom(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/nutritions/:id - Get own custom nutrition item
pub async fn get_custom(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = NutritionService::new().await?;
    let response = service.get_by_id(id, Visibility::Custom, Some(user.user_id)).await?;
    Ok(Json(response))
}

/// GET /api/v1/nutritions/default/:id - Get a default nutrition item
pub async fn get_default(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let service = NutritionService::new().await?;
    let response = service.get_by_id(id, Visibility::Default, None).await?;
    Ok(Json(response))
}

/// GET /api/v1/nutritions - List defaults plus own customs
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<NutritionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = NutritionService::new().await?;
    let is_custom = query.is_custom;
    let response = service.list_with_filter(query.into_params(Some(user.user_id), is_custom)?).await?;
    Ok(Json(response))
}

/// GET /api/v1/nutritions/default - List default nutrition items (public)
pub async fn list_default(Query(query): Query<NutritionListQuery>) -> Result<impl IntoResponse, ApiError> {
    let service = NutritionService::new().await?;
    let response = service.list_with_filter(query.into_params(None, Some(false))?).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/nutritions/:id - Partially update a custom nutrition item
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NutritionUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_optional_title("title", payload.title.as_deref()),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = NutritionService::new().await?;
    let response = service.update_custom(user.user_id, id, payload).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/nutritions/:id - Delete a custom nutrition item
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = NutritionService::new().await?;
    service.delete_custom(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/nutritions/types - List the nutrition type taxonomy
pub async fn list_types() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let types = taxonomies::list_nutrition_types(&pool).await.map_err(CatalogError::from)?;
    Ok(Json(types))
}
