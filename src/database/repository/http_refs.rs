use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::models::http_ref::HttpRef;
use crate::filter::PageRequest;

// Visibility predicate shared by list and count: NULL flag means defaults
// plus the caller's customs, otherwise exactly the requested flavor.
const VISIBILITY_WHERE: &str = "(($1::boolean IS NULL AND (is_custom = FALSE OR user_id = $2))
     OR ($1 = FALSE AND is_custom = FALSE)
     OR ($1 = TRUE AND is_custom = TRUE AND user_id = $2))";

#[derive(Debug, Default, Clone)]
pub struct HttpRefFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct NewHttpRef {
    pub name: String,
    pub description: Option<String>,
    pub ref_value: String,
    pub user_id: Uuid,
}

pub struct HttpRefChanges {
    pub name: String,
    pub description: Option<String>,
    pub ref_value: String,
}

pub async fn find_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<HttpRef>, sqlx::Error> {
    sqlx::query_as::<_, HttpRef>("SELECT * FROM http_refs WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_ids(exec: impl PgExecutor<'_>, ids: &[Uuid]) -> Result<Vec<HttpRef>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, HttpRef>("SELECT * FROM http_refs WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(exec)
        .await
}

/// Exact-match duplicate probe over {all defaults} ∪ {this owner's customs},
/// optionally ignoring the record under update.
pub async fn name_taken(
    exec: impl PgExecutor<'_>,
    name: &str,
    owner_id: Uuid,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM http_refs
              WHERE name = $1
                AND (is_custom = FALSE OR user_id = $2)
                AND ($3::uuid IS NULL OR id <> $3)
         )",
    )
    .bind(name)
    .bind(owner_id)
    .bind(exclude_id)
    .fetch_one(exec)
    .await
}

pub async fn insert(exec: impl PgExecutor<'_>, new: &NewHttpRef) -> Result<HttpRef, sqlx::Error> {
    sqlx::query_as::<_, HttpRef>(
        "INSERT INTO http_refs (name, description, ref, is_custom, user_id)
         VALUES ($1, $2, $3, TRUE, $4)
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.ref_value)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update(exec: impl PgExecutor<'_>, id: Uuid, changes: &HttpRefChanges) -> Result<HttpRef, sqlx::Error> {
    sqlx::query_as::<_, HttpRef>(
        "UPDATE http_refs
            SET name = $2, description = $3, ref = $4, updated_at = now()
          WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(&changes.ref_value)
    .fetch_one(exec)
    .await
}

pub async fn delete(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM http_refs WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn list(
    exec: impl PgExecutor<'_>,
    filter: &HttpRefFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<HttpRef>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM http_refs
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
          {order_clause} LIMIT $5 OFFSET $6"
    );
    sqlx::query_as::<_, HttpRef>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.name)
        .bind(&filter.description)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count(exec: impl PgExecutor<'_>, filter: &HttpRefFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM http_refs
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.name)
        .bind(&filter.description)
        .fetch_one(exec)
        .await
}
