use sqlx::PgExecutor;
use uuid::Uuid;

use super::Linked;
use crate::database::models::exercise::Exercise;
use crate::database::models::http_ref::HttpRef;
use crate::database::models::taxonomy::BodyPart;
use crate::filter::PageRequest;

const VISIBILITY_WHERE: &str = "(($1::boolean IS NULL AND (is_custom = FALSE OR user_id = $2))
     OR ($1 = FALSE AND is_custom = FALSE)
     OR ($1 = TRUE AND is_custom = TRUE AND user_id = $2))";

#[derive(Debug, Default, Clone)]
pub struct ExerciseFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub needs_equipment: Option<bool>,
    pub body_part_ids: Option<Vec<Uuid>>,
}

pub struct NewExercise {
    pub title: String,
    pub description: Option<String>,
    pub needs_equipment: bool,
    pub user_id: Uuid,
}

pub struct ExerciseChanges {
    pub title: String,
    pub description: Option<String>,
    pub needs_equipment: bool,
}

pub async fn find_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_ids(exec: impl PgExecutor<'_>, ids: &[Uuid]) -> Result<Vec<Exercise>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(exec)
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
             SELECT 1 FROM exercises
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

pub async fn insert(exec: impl PgExecutor<'_>, new: &NewExercise) -> Result<Exercise, sqlx::Error> {
    sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (title, description, needs_equipment, is_custom, user_id)
         VALUES ($1, $2, $3, TRUE, $4)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.needs_equipment)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update(exec: impl PgExecutor<'_>, id: Uuid, changes: &ExerciseChanges) -> Result<Exercise, sqlx::Error> {
    sqlx::query_as::<_, Exercise>(
        "UPDATE exercises
            SET title = $2, description = $3, needs_equipment = $4, updated_at = now()
          WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.needs_equipment)
    .fetch_one(exec)
    .await
}

/// Deletes the exercise row; join rows go with it (ON DELETE CASCADE on the
/// link tables only), referenced body parts and http refs stay.
pub async fn delete(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM exercises WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn replace_body_parts(
    exec: impl PgExecutor<'_>,
    exercise_id: Uuid,
    body_part_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "WITH cleared AS (DELETE FROM exercise_body_parts WHERE exercise_id = $1)
         INSERT INTO exercise_body_parts (exercise_id, body_part_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(exercise_id)
    .bind(body_part_ids)
    .execute(exec)
    .await?;
    Ok(())
}

/// Clearing and inserting are separate statements so an empty list cleanly
/// clears the slot.
pub async fn clear_http_refs(exec: impl PgExecutor<'_>, exercise_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM exercise_http_refs WHERE exercise_id = $1")
        .bind(exercise_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn add_http_refs(
    exec: impl PgExecutor<'_>,
    exercise_id: Uuid,
    http_ref_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if http_ref_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO exercise_http_refs (exercise_id, http_ref_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(exercise_id)
    .bind(http_ref_ids)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn body_parts_for(
    exec: impl PgExecutor<'_>,
    exercise_ids: &[Uuid],
) -> Result<Vec<Linked<BodyPart>>, sqlx::Error> {
    if exercise_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<BodyPart>>(
        "SELECT ebp.exercise_id AS parent_id, bp.id, bp.name
           FROM exercise_body_parts ebp
           JOIN body_parts bp ON bp.id = ebp.body_part_id
          WHERE ebp.exercise_id = ANY($1)
          ORDER BY bp.id",
    )
    .bind(exercise_ids)
    .fetch_all(exec)
    .await
}

pub async fn http_refs_for(
    exec: impl PgExecutor<'_>,
    exercise_ids: &[Uuid],
) -> Result<Vec<Linked<HttpRef>>, sqlx::Error> {
    if exercise_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<HttpRef>>(
        "SELECT ehr.exercise_id AS parent_id, hr.*
           FROM exercise_http_refs ehr
           JOIN http_refs hr ON hr.id = ehr.http_ref_id
          WHERE ehr.exercise_id = ANY($1)
          ORDER BY hr.id",
    )
    .bind(exercise_ids)
    .fetch_all(exec)
    .await
}

pub async fn list(
    exec: impl PgExecutor<'_>,
    filter: &ExerciseFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<Exercise>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM exercises
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::boolean IS NULL OR needs_equipment = $5)
            AND ($6::uuid[] IS NULL OR EXISTS (
                    SELECT 1 FROM exercise_body_parts ebp
                     WHERE ebp.exercise_id = exercises.id AND ebp.body_part_id = ANY($6)))
          {order_clause} LIMIT $7 OFFSET $8"
    );
    sqlx::query_as::<_, Exercise>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.needs_equipment)
        .bind(&filter.body_part_ids)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count(exec: impl PgExecutor<'_>, filter: &ExerciseFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM exercises
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::boolean IS NULL OR needs_equipment = $5)
            AND ($6::uuid[] IS NULL OR EXISTS (
                    SELECT 1 FROM exercise_body_parts ebp
                     WHERE ebp.exercise_id = exercises.id AND ebp.body_part_id = ANY($6)))"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.needs_equipment)
        .bind(&filter.body_part_ids)
        .fetch_one(exec)
        .await
}
