use sqlx::PgExecutor;
use uuid::Uuid;

use super::Linked;
use crate::database::models::http_ref::HttpRef;
use crate::database::models::nutrition::Nutrition;
use crate::filter::PageRequest;

const VISIBILITY_WHERE: &str = "(($1::boolean IS NULL AND (is_custom = FALSE OR user_id = $2))
     OR ($1 = FALSE AND is_custom = FALSE)
     OR ($1 = TRUE AND is_custom = TRUE AND user_id = $2))";

#[derive(Debug, Default, Clone)]
pub struct NutritionFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub nutrition_type_id: Option<Uuid>,
}

pub struct NewNutrition {
    pub title: String,
    pub description: Option<String>,
    pub nutrition_type_id: Uuid,
    pub user_id: Uuid,
}

pub struct NutritionChanges {
    pub title: String,
    pub description: Option<String>,
    pub nutrition_type_id: Uuid,
}

pub async fn find_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Nutrition>, sqlx::Error> {
    sqlx::query_as::<_, Nutrition>("SELECT * FROM nutritions WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn title_taken(
    exec: impl PgExecutor<'_>,
    title: &str,
    owner_id: Uuid,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM nutritions
              WHERE title = $1
                AND (is_custom = FALSE OR user_id = $2)
                AND ($3::uuid IS NULL OR id <> $3)
         )",
    )
    .bind(title)
    .bind(owner_id)
    .bind(exclude_id)
    .fetch_one(exec)
    .await
}

pub async fn insert(exec: impl PgExecutor<'_>, new: &NewNutrition) -> Result<Nutrition, sqlx::Error> {
    sqlx::query_as::<_, Nutrition>(
        "INSERT INTO nutritions (title, description, nutrition_type_id, is_custom, user_id)
         VALUES ($1, $2, $3, TRUE, $4)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.nutrition_type_id)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update(exec: impl PgExecutor<'_>, id: Uuid, changes: &NutritionChanges) -> Result<Nutrition, sqlx::Error> {
    sqlx::query_as::<_, Nutrition>(
        "UPDATE nutritions
            SET title = $2, description = $3, nutrition_type_id = $4, updated_at = now()
          WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.nutrition_type_id)
    .fetch_one(exec)
    .await
}

pub async fn delete(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM nutritions WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn clear_http_refs(exec: impl PgExecutor<'_>, nutrition_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM nutrition_http_refs WHERE nutrition_id = $1")
        .bind(nutrition_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn add_http_refs(
    exec: impl PgExecutor<'_>,
    nutrition_id: Uuid,
    http_ref_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if http_ref_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO nutrition_http_refs (nutrition_id, http_ref_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(nutrition_id)
    .bind(http_ref_ids)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn http_refs_for(
    exec: impl PgExecutor<'_>,
    nutrition_ids: &[Uuid],
) -> Result<Vec<Linked<HttpRef>>, sqlx::Error> {
    if nutrition_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<HttpRef>>(
        "SELECT nhr.nutrition_id AS parent_id, hr.*
           FROM nutrition_http_refs nhr
           JOIN http_refs hr ON hr.id = nhr.http_ref_id
          WHERE nhr.nutrition_id = ANY($1)
          ORDER BY hr.id",
    )
    .bind(nutrition_ids)
    .fetch_all(exec)
    .await
}

pub async fn list(
    exec: impl PgExecutor<'_>,
    filter: &NutritionFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<Nutrition>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM nutritions
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::uuid IS NULL OR nutrition_type_id = $5)
          {order_clause} LIMIT $6 OFFSET $7"
    );
    sqlx::query_as::<_, Nutrition>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.nutrition_type_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count(exec: impl PgExecutor<'_>, filter: &NutritionFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM nutritions
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::uuid IS NULL OR nutrition_type_id = $5)"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.nutrition_type_id)
        .fetch_one(exec)
        .await
}
