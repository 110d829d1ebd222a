use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::models::user::{Role, User};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub password_salt: String,
    pub role_id: Uuid,
}

pub async fn find_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_username(exec: impl PgExecutor<'_>, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(exec)
        .await
}

pub async fn username_or_email_taken(
    exec: impl PgExecutor<'_>,
    username: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)")
        .bind(username)
        .bind(email)
        .fetch_one(exec)
        .await
}

pub async fn insert(exec: impl PgExecutor<'_>, user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, full_name, password_hash, password_salt, role_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .bind(user.role_id)
    .fetch_one(exec)
    .await
}

pub async fn find_role_by_name(exec: impl PgExecutor<'_>, name: &str) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
        .bind(name)
        .fetch_optional(exec)
        .await
}
