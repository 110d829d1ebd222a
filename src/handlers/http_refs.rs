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
use crate::services::http_ref_service::{
    HttpRefCreateRequest, HttpRefListParams, HttpRefService, HttpRefUpdateRequest,
};
use crate::validation;

const DEFAULT_SORT: &str = "name";

#[derive(Debug, Deserialize)]
pub struct HttpRefListQuery {
    pub is_custom: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
}

impl HttpRefListQuery {
    fn into_params(self, user_id: Option<Uuid>, is_custom: Option<bool>) -> Result<HttpRefListParams, ApiError> {
        Ok(HttpRefListParams {
            is_custom,
            user_id,
            name: self.name,
            description: self.description,
            sort: sort_spec(self.sort_field, self.sort_direction, DEFAULT_SORT)?,
            page: page_request(self.page_number, self.page_size)?,
        })
    }
}

/// POST /api/v1/workouts/http-refs - Create a custom http ref
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<HttpRefCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_title("name", &payload.name),
        validation::validate_optional_description("description", payload.description.as_deref()),
        validation::validate_ref_url("ref", &payload.r#ref),
    ])?;

    let service = HttpRefService::new().await?;
    let response = service.create_custom(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/workouts/http-refs/:id - Get own custom http ref
pub async fn get_custom(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = HttpRefService::new().await?;
    let response = service.get_by_id(id, Visibility::Custom, Some(user.user_id)).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts/http-refs/default/:id - Get a default http ref
pub async fn get_default(Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let service = HttpRefService::new().await?;
    let response = service.get_by_id(id, Visibility::Default, None).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts/http-refs - List defaults plus own customs, with
/// filters; `is_custom` narrows to one flavor.
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HttpRefListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = HttpRefService::new().await?;
    let is_custom = query.is_custom;
    let response = service.list_with_filter(query.into_params(Some(user.user_id), is_custom)?).await?;
    Ok(Json(response))
}

/// GET /api/v1/workouts/http-refs/default - List default http refs (public)
pub async fn list_default(Query(query): Query<HttpRefListQuery>) -> Result<impl IntoResponse, ApiError> {
    let service = HttpRefService::new().await?;
    let response = service.list_with_filter(query.into_params(None, Some(false))?).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/workouts/http-refs/:id - Partially update a custom http ref
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HttpRefUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_optional_title("name", payload.name.as_deref()),
        validation::validate_optional_description("description", payload.description.as_deref()),
        validation::validate_optional_ref_url("ref", payload.r#ref.as_deref()),
    ])?;

    let service = HttpRefService::new().await?;
    let response = service.update_custom(user.user_id, id, payload).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/workouts/http-refs/:id - Delete a custom http ref
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = HttpRefService::new().await?;
    service.delete_custom(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
