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
use crate::services::mental_activity_service::{
    MentalActivityCreateRequest, MentalActivityListParams, MentalActivityService, MentalActivityUpdateRequest,
};
use crate::services::mental_workout_service::{
    MentalWorkoutCreateRequest, MentalWorkoutListParams, MentalWorkoutService, MentalWorkoutUpdateRequest,
};
use crate::validation;

const DEFAULT_SORT: &str = "title";

// --- mental activities ---

#[derive(Debug, Deserialize)]
pub struct MentalActivityListQuery {
    pub is_custom: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub mental_type_id: Option<Uuid>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
}

impl MentalActivityListQuery {
    fn into_params(
        self,
        user_id: Option<Uuid>,
        is_custom: Option<bool>,
    ) -> Result<MentalActivityListParams, ApiError> {
        Ok(MentalActivityListParams {
            is_custom,
            user_id,
            title: self.title,
            description: self.description,
            mental_type_id: self.mental_type_id,
            sort: sort_spec(self.sort_field, self.sort_direction, DEFAULT_SORT)?,
            page: page_request(self.page_number, self.page_size)?,
        })
    }
}

/// POST /api/v1/mentals/activities - Create a custom mental activity
pub async fn create_activity(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MentalActivityCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_title("title", &payload.title),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = MentalActivityService::new().await?;
    let response = service.create_custom(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/mentals/activities/:id - Get own custom mental activity
pub async fn get_custom_activity(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalActivityService::new().await?;
    let response = service.get_by_id(id, Visibility::Custom, Some(user.user_id)).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/activities/default/:id - Get a default mental activity
pub async fn get_default_activity(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let service = MentalActivityService::new().await?;
    let response = service.get_by_id(id, Visibility::Default, None).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/activities - List defaults plus own customs
pub async fn list_activities(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MentalActivityListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalActivityService::new().await?;
    let is_custom = query.is_custom;
    let response = service.list_with_filter(query.into_params(Some(user.user_id), is_custom)?).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/activities/default - List default mental activities (public)
pub async fn list_default_activities(
    Query(query): Query<MentalActivityListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalActivityService::new().await?;
    let response = service.list_with_filter(query.into_params(None, Some(false))?).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/mentals/activities/:id - Partially update a custom mental activity
pub async fn update_activity(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MentalActivityUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_optional_title("title", payload.title.as_deref()),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = MentalActivityService::new().await?;
    let response = service.update_custom(user.user_id, id, payload).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/mentals/activities/:id - Delete a custom mental activity
pub async fn delete_activity(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalActivityService::new().await?;
    service.delete_custom(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/mentals/types - List the mental type taxonomy
pub async fn list_types() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let types = taxonomies::list_mental_types(&pool).await.map_err(CatalogError::from)?;
    Ok(Json(types))
}

// --- mental workouts ---

#[derive(Debug, Deserialize)]
pub struct MentalWorkoutListQuery {
    pub is_custom: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
}

impl MentalWorkoutListQuery {
    fn into_params(self, user_id: Option<Uuid>, is_custom: Option<bool>) -> Result<MentalWorkoutListParams, ApiError> {
        Ok(MentalWorkoutListParams {
            is_custom,
            user_id,
            title: self.title,
            description: self.description,
            sort: sort_spec(self.sort_field, self.sort_direction, DEFAULT_SORT)?,
            page: page_request(self.page_number, self.page_size)?,
        })
    }
}

/// POST /api/v1/mentals/workouts - Create a custom mental workout
pub async fn create_workout(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MentalWorkoutCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_title("title", &payload.title),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = MentalWorkoutService::new().await?;
    let response = service.create_custom(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/mentals/workouts/:id - Get own custom mental workout
pub async fn get_custom_workout(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalWorkoutService::new().await?;
    let response = service.get_by_id(id, Visibility::Custom, Some(user.user_id)).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/workouts/default/:id - Get a default mental workout
pub async fn get_default_workout(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let service = MentalWorkoutService::new().await?;
    let response = service.get_by_id(id, Visibility::Default, None).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/workouts - List defaults plus own customs
pub async fn list_workouts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MentalWorkoutListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalWorkoutService::new().await?;
    let is_custom = query.is_custom;
    let response = service.list_with_filter(query.into_params(Some(user.user_id), is_custom)?).await?;
    Ok(Json(response))
}

/// GET /api/v1/mentals/workouts/default - List default mental workouts (public)
pub async fn list_default_workouts(
    Query(query): Query<MentalWorkoutListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalWorkoutService::new().await?;
    let response = service.list_with_filter(query.into_params(None, Some(false))?).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/mentals/workouts/:id - Partially update a custom mental workout
pub async fn update_workout(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MentalWorkoutUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_optional_title("title", payload.title.as_deref()),
        validation::validate_optional_description("description", payload.description.as_deref()),
    ])?;

    let service = MentalWorkoutService::new().await?;
    let response = service.update_custom(user.user_id, id, payload).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/mentals/workouts/:id - Delete a custom mental workout
pub async fn delete_workout(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = MentalWorkoutService::new().await?;
    service.delete_custom(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
