use sqlx::PgExecutor;
use uuid::Uuid;

use super::Linked;
use crate::database::models::exercise::Exercise;
use crate::database::models::workout::Workout;
use crate::filter::PageRequest;

const VISIBILITY_WHERE: &str = "(($1::boolean IS NULL AND (is_custom = FALSE OR user_id = $2))
     OR ($1 = FALSE AND is_custom = FALSE)
     OR ($1 = TRUE AND is_custom = TRUE AND user_id = $2))";

#[derive(Debug, Default, Clone)]
pub struct WorkoutFilter {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub struct NewWorkout {
    pub title: String,
    pub description: Option<String>,
    pub user_id: Uuid,
}

pub struct WorkoutChanges {
    pub title: String,
    pub description: Option<String>,
}

pub async fn find_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Workout>, sqlx::Error> {
    sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = $1")
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
             SELECT 1 FROM workouts
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

pub async fn insert(exec: impl PgExecutor<'_>, new: &NewWorkout) -> Result<Workout, sqlx::Error> {
    sqlx::query_as::<_, Workout>(
        "INSERT INTO workouts (title, description, is_custom, user_id)
         VALUES ($1, $2, TRUE, $3)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.user_id)
    .fetch_one(exec)
    .await
}

pub async fn update(exec: impl PgExecutor<'_>, id: Uuid, changes: &WorkoutChanges) -> Result<Workout, sqlx::Error> {
    sqlx::query_as::<_, Workout>(
        "UPDATE workouts
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

pub async fn delete(exec: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM workouts WHERE id = $1").bind(id).execute(exec).await?;
    Ok(())
}

pub async fn replace_exercises(
    exec: impl PgExecutor<'_>,
    workout_id: Uuid,
    exercise_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "WITH cleared AS (DELETE FROM workout_exercises WHERE workout_id = $1)
         INSERT INTO workout_exercises (workout_id, exercise_id)
         SELECT $1, unnest($2::uuid[])",
    )
    .bind(workout_id)
    .bind(exercise_ids)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn exercises_for(
    exec: impl PgExecutor<'_>,
    workout_ids: &[Uuid],
) -> Result<Vec<Linked<Exercise>>, sqlx::Error> {
    if workout_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, Linked<Exercise>>(
        "SELECT we.workout_id AS parent_id, e.*
           FROM workout_exercises we
           JOIN exercises e ON e.id = we.exercise_id
          WHERE we.workout_id = ANY($1)
          ORDER BY e.id",
    )
    .bind(workout_ids)
    .fetch_all(exec)
    .await
}

pub async fn list(
    exec: impl PgExecutor<'_>,
    filter: &WorkoutFilter,
    order_clause: &str,
    page: &PageRequest,
) -> Result<Vec<Workout>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM workouts
          WHERE {VISIBILITY_WHERE}
            AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%')
            AND ($4::text IS NULL OR description ILIKE '%' || $4 || '%')
          {order_clause} LIMIT $5 OFFSET $6"
    );
    sqlx::query_as::<_, Workout>(&sql)
        .bind(filter.is_custom)
        .bind(filter.user_id)
        .bind(&filter.title)
        .bind(&filter.description)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(exec)
        .await
}

pub async fn count(exec: impl PgExecutor<'_>, filter: &WorkoutFilter) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "SELECT COUNT(*) FROM workouts
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
