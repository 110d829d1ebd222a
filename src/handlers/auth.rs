use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::catalog::CatalogError;
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::repository::users::{self, NewUser};
use crate::error::ApiError;
use crate::validation;

const USER_ROLE: &str = "ROLE_USER";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// POST /api/v1/users/signup - Register a new user
pub async fn signup(Json(payload): Json<SignupRequest>) -> Result<impl IntoResponse, ApiError> {
    validation::collect([
        validation::validate_username("username", &payload.username),
        validation::validate_email("email", &payload.email),
        validation::validate_optional_title("full_name", payload.full_name.as_deref()),
        validation::validate_password("password", &payload.password),
    ])?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await.map_err(CatalogError::from)?;

    if users::username_or_email_taken(&mut *tx, &payload.username, &payload.email)
        .await
        .map_err(CatalogError::from)?
    {
        return Err(ApiError::conflict("Already exists"));
    }

    // The user role is seeded by migrations; its absence is an invariant
    // violation, not a caller mistake.
    let role = users::find_role_by_name(&mut *tx, USER_ROLE)
        .await
        .map_err(CatalogError::from)?
        .ok_or_else(|| {
            tracing::error!("seeded role {} is missing", USER_ROLE);
            ApiError::from(CatalogError::Server)
        })?;

    let salt = auth::new_salt();
    let user = users::insert(
        &mut *tx,
        &NewUser {
            username: payload.username,
            email: payload.email,
            full_name: payload.full_name,
            password_hash: auth::hash_password(&payload.password, &salt),
            password_salt: salt,
            role_id: role.id,
        },
    )
    .await
    .map_err(CatalogError::from)?;
    tx.commit().await.map_err(CatalogError::from)?;

    info!(user_id = %user.id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }),
    ))
}

/// POST /api/v1/users/auth/login - Authenticate and receive a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_username(&pool, &payload.username)
        .await
        .map_err(CatalogError::from)?
        .ok_or_else(|| ApiError::unauthorized("Authentication error"))?;

    if !auth::verify_password(&payload.password, &user.password_salt, &user.password_hash) {
        return Err(ApiError::unauthorized("Authentication error"));
    }

    let token = auth::generate_jwt(Claims::new(user.id, user.username.clone())).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Server error")
    })?;

    Ok(Json(json!({
        "token": token,
        "expires_in_hours": config::config().security.jwt_expiry_hours,
        "user": UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        },
    })))
}
