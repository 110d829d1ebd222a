use sqlx::PgExecutor;
use uuid::Uuid;

use super::Linked;
use crate::database::models::http_ref::HttpRef;
use crate::database::models::mental::{MentalActivity, MentalWorkout};
use crate::filter::PageRequest;

const VISIBILITY_WHERE: &str = "(($1::boolean IS NULL AND (is_custom = FALSE OR user_id = $2))
     OR ($1 = FALSE AND is_custom = FALSE)
     OR ($1 = TRUE AND is_custom = TRUE AND user_id = $2))";

#[derive(Debug, Default, Clone)]
pub struct MentalActivityFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub mental_type_id: Option<Uuid>,
}

pub struct NewMentalActivity {
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
    pub user_id: Uuid,
}

pub struct MentalActivityChanges {
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
}

pub async fn find_activity_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<MentalActivity>, sqlx::Error> {
    sqlx::query_as::<_, MentalActivity>("SELECT * FROM mental_activities WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_activities_by_ids(
    exec: impl PgExecutor<'_>,
    ids: &[Uuid],
) -> Result<Vec<MentalActivity>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, MentalActivity>("SELECT * FROM mental_activities WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(exec)
        .await
}

pub async fn activity_title_taken(
    exec: impl PgExecutor<'_>,
    title: &str,
    owner_id: Uuid,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM mental_activities
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

pub async fn insert_activity(
    exec: impl PgExecutor<'_>,
    new: &NewMentalActivity,
) -> Result<MentalActivity, sqlx::Error> {
    sqlx::query_as::<_, MentalActivity>(
        "INSERT INTO mental_activities (title, description, mental_type_id, is_custom, user_id)
         VALUES ($1, $2, $3, TRUE, $4)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.mental_type_id)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update_activity(
    exec: impl PgExecutor<'_>,
    id: Uuid,
    changes: &MentalActivityChanges,
) -> Result<MentalActivity, sqlx::Error> {
    sqlx::query_as::<_, MentalActivity>(
        "UPDATE mental_activities
            SET title = $2, description = $3, mental_type_id = $4, updated_at = now()
          WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.mental_type_id)
    .fetch_one(exec)
    .await
}

pub async fn delete_activity(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM mental_activities WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn clear_activity_http_refs(exec: impl PgExecutor<'_>, activity_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM mental_activity_http_refs WHERE mental_activity_id = $1")
        .bind(activity_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn add_activity_http_refs(
    exec: impl PgExecutor<'_>,
    activity_id: Uuid,
    http_ref_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if http_ref_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO mental_activity_http_refs (mental_activity_id, http_ref_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(activity_id)
    .bind(http_ref_ids)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn http_refs_for_activities(
    exec: impl PgExecutor<'_>,
    activity_ids: &[Uuid],
) -> Result<Vec<Linked<HttpRef>>, sqlx::Error> {
    if activity_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<HttpRef>>(
        "SELECT mhr.mental_activity_id AS parent_id, hr.*
           FROM mental_activity_http_refs mhr
           JOIN http_refs hr ON hr.id = mhr.http_ref_id
          WHERE mhr.mental_activity_id = ANY($1)
          ORDER BY hr.id",
    )
    .bind(activity_ids)
    .fetch_all(exec)
    .await
}

pub async fn list_activities(
    exec: impl PgExecutor<'_>,
    filter: &MentalActivityFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<MentalActivity>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM mental_activities
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::uuid IS NULL OR mental_type_id = $5)
          {order_clause} LIMIT $6 OFFSET $7"
    );
    sqlx::query_as::<_, MentalActivity>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.mental_type_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count_activities(exec: impl PgExecutor<'_>, filter: &MentalActivityFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM mental_activities
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
            AND ($5::uuid IS NULL OR mental_type_id = $5)"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(filter.mental_type_id)
        .fetch_one(exec)
        .await
}

// --- mental workouts ---

#[derive(Debug, Default, Clone)]
pub struct MentalWorkoutFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub struct NewMentalWorkout {
    pub title: String,
    pub description: Option<String>,
    pub user_id: Uuid,
}

pub struct MentalWorkoutChanges {
    pub title: String,
    pub description: Option<String>,
}

pub async fn find_workout_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<MentalWorkout>, sqlx::Error> {
    sqlx::query_as::<_, MentalWorkout>("SELECT * FROM mental_workouts WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn workout_title_taken(
    exec: impl PgExecutor<'_>,
    title: &str,
    owner_id: Uuid,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM mental_workouts
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

pub async fn insert_workout(exec: impl PgExecutor<'_>, new: &NewMentalWorkout) -> Result<MentalWorkout, sqlx::Error> {
    sqlx::query_as::<_, MentalWorkout>(
        "INSERT INTO mental_workouts (title, description, is_custom, user_id)
         VALUES ($1, $2, TRUE, $3)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update_workout(
    exec: impl PgExecutor<'_>,
    id: Uuid,
    changes: &MentalWorkoutChanges,
) -> Result<MentalWorkout, sqlx::Error> {
    sqlx::query_as::<_, MentalWorkout>(
        "UPDATE mental_workouts
            SET title = $2, description = $3, updated_at = now()
          WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .fetch_one(exec)
    .await
}

pub async fn delete_workout(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM mental_workouts WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn replace_workout_activities(
    exec: impl PgExecutor<'_>,
    workout_id: Uuid,
    activity_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "WITH cleared AS (DELETE FROM mental_workout_activities WHERE mental_workout_id = $1)
         INSERT INTO mental_workout_activities (mental_workout_id, mental_activity_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(workout_id)
    .bind(activity_ids)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn activities_for_workouts(
    exec: impl PgExecutor<'_>,
    workout_ids: &[Uuid],
) -> Result<Vec<Linked<MentalActivity>>, sqlx::Error> {
    if workout_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<MentalActivity>>(
        "SELECT mwa.mental_workout_id AS parent_id, ma.*
           FROM mental_workout_activities mwa
           JOIN mental_activities ma ON ma.id = mwa.mental_activity_id
          WHERE mwa.mental_workout_id = ANY($1)
          ORDER BY ma.id",
    )
    .bind(workout_ids)
    .fetch_all(exec)
    .await
}

pub async fn list_workouts(
    exec: impl PgExecutor<'_>,
    filter: &MentalWorkoutFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<MentalWorkout>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM mental_workouts
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
          {order_clause} LIMIT $5 OFFSET $6"
    );
    sqlx::query_as::<_, MentalWorkout>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count_workouts(exec: impl PgExecutor<'_>, filter: &MentalWorkoutFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM mental_workouts
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .fetch_one(exec)
        .await
}
