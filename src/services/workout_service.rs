use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::catalog::{
    require_all, require_same_owner, validate_access, AccessMode, CatalogError, Differ, Visibility,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::exercise::Exercise;
use crate::database::models::workout::Workout;
use crate::database::repository::{
    exercises, group_by_parent,
    workouts::{self, NewWorkout, WorkoutChanges, WorkoutFilter},
};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "title", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct WorkoutCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub exercise_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub exercise_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct WorkoutListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

/// Exercises are embedded without their own nested relations; clients fetch
/// an exercise directly when they need its body parts or refs.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutExerciseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub needs_equipment: bool,
    pub is_custom: bool,
}

impl From<Exercise> for WorkoutExerciseResponse {
    fn from(row: Exercise) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            needs_equipment: row.needs_equipment,
            is_custom: row.is_custom,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_custom: bool,
    pub exercises: Vec<WorkoutExerciseResponse>,
}

impl WorkoutResponse {
    fn assemble(row: Workout, exercises: Vec<WorkoutExerciseResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            is_custom: row.is_custom,
            exercises,
        }
    }
}

pub struct WorkoutService {
    pool: PgPool,
}

impl WorkoutService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: WorkoutCreateRequest,
    ) -> Result<WorkoutResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if request.exercise_ids.is_empty() {
            return Err(CatalogError::EmptyRequiredRelation("exercises").into());
        }
        let resolved = require_all(
            &request.exercise_ids,
            exercises::find_by_ids(&mut *tx, &request.exercise_ids).await?,
        )?;
        require_same_owner(&resolved, user_id)?;

        if workouts::title_taken(&mut *tx, &request.title, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        // Join rows come from the resolved set, which is deduplicated.
        let exercise_ids: Vec<Uuid> = resolved.iter().map(|e| e.id).collect();

        let row = workouts::insert(
            &mut *tx,
            &NewWorkout {
                title: request.title,
                description: request.description,
                user_id,
            },
        )
        .await?;
        workouts::replace_exercises(&mut *tx, row.id, &exercise_ids).await?;
        tx.commit().await?;

        info!(workout_id = %row.id, "created custom workout");
        Ok(WorkoutResponse::assemble(
            row,
            resolved.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<WorkoutResponse, ServiceError> {
        let row = workouts::find_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        let mut responses = self.assemble_all(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn list_with_filter(&self, params: WorkoutListParams) -> Result<Page<WorkoutResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = WorkoutFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            title: params.title,
            description: params.description,
        };
        let rows = workouts::list(&self.pool, &filter, &order, &params.page).await?;
        let total = workouts::count(&self.pool, &filter).await?;
        let items = self.assemble_all(rows).await?;
        Ok(Page::new(items, &params.page, total))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: WorkoutUpdateRequest,
    ) -> Result<WorkoutResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = workouts::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        let new_exercises = match &patch.exercise_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Err(CatalogError::EmptyRequiredRelation("exercises").into());
                }
                let resolved = require_all(ids, exercises::find_by_ids(&mut *tx, ids).await?)?;
                require_same_owner(&resolved, user_id)?;
                Some(resolved.iter().map(|e| e.id).collect::<Vec<Uuid>>())
            }
            None => None,
        };

        if let Some(title) = &patch.title {
            if title != &row.title && workouts::title_taken(&mut *tx, title, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = WorkoutChanges {
            title: differ.field("title", &row.title, patch.title.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
        };
        if patch.exercise_ids.is_some() {
            differ.relation();
        }
        differ.finish()?;

        let updated = workouts::update(&mut *tx, id, &changes).await?;
        if let Some(exercise_ids) = &new_exercises {
            workouts::replace_exercises(&mut *tx, id, exercise_ids).await?;
        }
        let response = Self::assemble_one(&mut tx, updated).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = workouts::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        // Link rows go with the workout; the exercises themselves stay.
        workouts::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(workout_id = %id, "deleted custom workout");
        Ok(id)
    }

    async fn assemble_all(&self, rows: Vec<Workout>) -> Result<Vec<WorkoutResponse>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|w| w.id).collect();
        let mut grouped = group_by_parent(workouts::exercises_for(&self.pool, &ids).await?);
        Ok(rows
            .into_iter()
            .map(|row| {
                let linked = grouped.remove(&row.id).unwrap_or_default();
                WorkoutResponse::assemble(row, linked.into_iter().map(Into::into).collect())
            })
            .collect())
    }

    async fn assemble_one(conn: &mut PgConnection, row: Workout) -> Result<WorkoutResponse, ServiceError> {
        let linked = workouts::exercises_for(&mut *conn, &[row.id]).await?;
        Ok(WorkoutResponse::assemble(
            row,
            linked.into_iter().map(|l| WorkoutExerciseResponse::from(l.item)).collect(),
        ))
    }
}
