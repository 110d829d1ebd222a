use sqlx::PgExecutor;
use uuid::Uuid;

use crate::database::models::taxonomy::{BodyPart, MentalType, NutritionType};

pub async fn list_body_parts(exec: impl PgExecutor<'_>) -> Result<Vec<BodyPart>, sqlx::Error> {
    sqlx::query_as::<_, BodyPart>("SELECT id, name FROM body_parts ORDER BY id")
        .fetch_all(exec)
        .await
}

pub async fn find_body_parts_by_ids(exec: impl PgExecutor<'_>, ids: &[Uuid]) -> Result<Vec<BodyPart>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, BodyPart>("SELECT id, name FROM body_parts WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(exec)
        .await
}

pub async fn list_mental_types(exec: impl PgExecutor<'_>) -> Result<Vec<MentalType>, sqlx::Error> {
    sqlx::query_as::<_, MentalType>("SELECT id, name FROM mental_types ORDER BY id")
        .fetch_all(exec)
        .await
}

pub async fn find_mental_type_by_id(exec: impl PgExecutor<'_>, id: Uuid) -> Result<Option<MentalType>, sqlx::Error> {
    sqlx::query_as::<_, MentalType>("SELECT id, name FROM mental_types WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn list_nutrition_types(exec: impl PgExecutor<'_>) -> Result<Vec<NutritionType>, sqlx::Error> {
    sqlx::query_as::<_, NutritionType>("SELECT id, name FROM nutrition_types ORDER BY id")
        .fetch_all(exec)
        .await
}

pub async fn find_nutrition_type_by_id(
    exec: impl PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<NutritionType>, sqlx::Error> {
    sqlx::query_as::<_, NutritionType>("SELECT id, name FROM nutrition_types WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await
}
