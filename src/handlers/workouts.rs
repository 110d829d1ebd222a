use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{page_request, sort_spec};
use crate::catalog::Visibility;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::workout_service::{
    WorkoutCreateRequest, WorkoutListParams, WorkoutService, WorkoutUpdateRequest,
};
use crate::validation;

const DEFAULT_SORT: &str = "title";

#[derive(Debug, Deserialize)]
pub struct WorkoutListQuery {
    pub is_custom: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
}

impl WorkoutListQuery {
    fn into_params(self, user_id: Option<Uuid>, is_custom: Option<bool>) -> Result<WorkoutListParams, ApiError> {
        Ok(WorkoutListParams {
            is_custom,
            user_id,
            title: self.title,
            description: self.description,
            sort: sort_spec(self.sort_field, self.sort_direction, DEFAULT_SORT)?,
            page: page_request(self.page_number, self.page_size)?,
        })
    }
}

/// POST /api/v1/workouts - Create a custom workout
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<WorkoutCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_title("title", &payload.title),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = WorkoutService::new().await?;
    let response = service.create_custom(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/workouts/:id - Get own custom workout
pub async fn get_custom(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = WorkoutService::new().await?;
    let response = service.get_by_id(id, Visibility::Custom, Some(user.user_id)).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts/default/:id - Get a default workout
pub async fn get_default(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let service = WorkoutService::new().await?;
    let response = service.get_by_id(id, Visibility::Default, None).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts - List defaults plus own customs
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<WorkoutListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = WorkoutService::new().await?;
    let is_custom = query.is_custom;
    let response = service.list_with_filter(query.into_params(Some(user.user_id), is_custom)?).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts/default - List default workouts (public)
pub async fn list_default(Query(query): Query<WorkoutListQuery>) -> Result<impl IntoResponse, ApiError> {
    let service = WorkoutService::new().await?;
    let response = service.list_with_filter(query.into_params(None, Some(false))?).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/workouts/:id - Partially update a custom workout
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkoutUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_optional_title("title", payload.title.as_deref()),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = WorkoutService::new().await?;
    let response = service.update_custom(user.user_id, id, payload).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/workouts/:id - Delete a custom workout
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = WorkoutService::new().await?;
    service.delete_custom(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
