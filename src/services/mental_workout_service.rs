use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::catalog::{
    require_all, require_same_owner, validate_access, AccessMode, CatalogError, Differ, Visibility,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::mental::{MentalActivity, MentalWorkout};
use crate::database::repository::{
    group_by_parent,
    mentals::{self, MentalWorkoutChanges, MentalWorkoutFilter, NewMentalWorkout},
};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "title", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct MentalWorkoutCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub mental_activity_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MentalWorkoutUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub mental_activity_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct MentalWorkoutListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentalWorkoutActivityResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
    pub is_custom: bool,
}

impl From<MentalActivity> for MentalWorkoutActivityResponse {
    fn from(row: MentalActivity) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            mental_type_id: row.mental_type_id,
            is_custom: row.is_custom,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MentalWorkoutResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_custom: bool,
    pub mental_activities: Vec<MentalWorkoutActivityResponse>,
}

impl MentalWorkoutResponse {
    fn assemble(row: MentalWorkout, mental_activities: Vec<MentalWorkoutActivityResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            is_custom: row.is_custom,
            mental_activities,
        }
    }
}

pub struct MentalWorkoutService {
    pool: PgPool,
}

impl MentalWorkoutService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: MentalWorkoutCreateRequest,
    ) -> Result<MentalWorkoutResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if request.mental_activity_ids.is_empty() {
            return Err(CatalogError::EmptyRequiredRelation("mental_activities").into());
        }
        let resolved = require_all(
            &request.mental_activity_ids,
            mentals::find_activities_by_ids(&mut *tx, &request.mental_activity_ids).await?,
        )?;
        require_same_owner(&resolved, user_id)?;

        if mentals::workout_title_taken(&mut *tx, &request.title, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        // Join rows come from the resolved set, which is deduplicated.
        let activity_ids: Vec<Uuid> = resolved.iter().map(|a| a.id).collect();

        let row = mentals::insert_workout(
            &mut *tx,
            &NewMentalWorkout {
                title: request.title,
                description: request.description,
                user_id,
            },
        )
        .await?;
        mentals::replace_workout_activities(&mut *tx, row.id, &activity_ids).await?;
        tx.commit().await?;

        info!(mental_workout_id = %row.id, "created custom mental workout");
        Ok(MentalWorkoutResponse::assemble(
            row,
            resolved.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<MentalWorkoutResponse, ServiceError> {
        let row = mentals::find_workout_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        let mut responses = self.assemble_all(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn list_with_filter(
        &self,
        params: MentalWorkoutListParams,
    ) -> Result<Page<MentalWorkoutResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = MentalWorkoutFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            title: params.title,
            description: params.description,
        };
        let rows = mentals::list_workouts(&self.pool, &filter, &order, &params.page).await?;
        let total = mentals::count_workouts(&self.pool, &filter).await?;
        let items = self.assemble_all(rows).await?;
        Ok(Page::new(items, &params.page, total))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: MentalWorkoutUpdateRequest,
    ) -> Result<MentalWorkoutResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = mentals::find_workout_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        let new_activities = match &patch.mental_activity_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Err(CatalogError::EmptyRequiredRelation("mental_activities").into());
                }
                let resolved = require_all(ids, mentals::find_activities_by_ids(&mut *tx, ids).await?)?;
                require_same_owner(&resolved, user_id)?;
                Some(resolved.iter().map(|a| a.id).collect::<Vec<Uuid>>())
            }
            None => None,
        };

        if let Some(title) = &patch.title {
            if title != &row.title && mentals::workout_title_taken(&mut *tx, title, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = MentalWorkoutChanges {
            title: differ.field("title", &row.title, patch.title.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
        };
        if patch.mental_activity_ids.is_some() {
            differ.relation();
        }
        differ.finish()?;

        let updated = mentals::update_workout(&mut *tx, id, &changes).await?;
        if let Some(activity_ids) = &new_activities {
            mentals::replace_workout_activities(&mut *tx, id, activity_ids).await?;
        }
        let response = Self::assemble_one(&mut tx, updated).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = mentals::find_workout_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        mentals::delete_workout(&mut *tx, id).await?;
        tx.commit().await?;

        info!(mental_workout_id = %id, "deleted custom mental workout");
        Ok(id)
    }

    async fn assemble_all(&self, rows: Vec<MentalWorkout>) -> Result<Vec<MentalWorkoutResponse>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|w| w.id).collect();
        let mut grouped = group_by_parent(mentals::activities_for_workouts(&self.pool, &ids).await?);
        Ok(rows
            .into_iter()
            .map(|row| {
                let linked = grouped.remove(&row.id).unwrap_or_default();
                MentalWorkoutResponse::assemble(row, linked.into_iter().map(Into::into).collect())
            })
            .collect())
    }

    async fn assemble_one(conn: &mut PgConnection, row: MentalWorkout) -> Result<MentalWorkoutResponse, ServiceError> {
        let linked = mentals::activities_for_workouts(&mut *conn, &[row.id]).await?;
        Ok(MentalWorkoutResponse::assemble(
            row,
            linked.into_iter().map(|l| MentalWorkoutActivityResponse::from(l.item)).collect(),
        ))
    }
}
