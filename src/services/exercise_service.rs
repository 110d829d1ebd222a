use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::http_ref_service::HttpRefResponse;
use super::ServiceError;
use crate::catalog::{
    require_all, require_same_owner, validate_access, AccessMode, CatalogError, Differ, Visibility,
};
use crate::database::manager::DatabaseManager;
use crate::database::models::exercise::Exercise;
use crate::database::models::taxonomy::BodyPart;
use crate::database::repository::{
    exercises::{self, ExerciseChanges, ExerciseFilter, NewExercise},
    group_by_parent, http_refs, taxonomies,
};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "title", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct ExerciseCreateRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub needs_equipment: bool,
    pub body_part_ids: Vec<Uuid>,
    #[serde(default)]
    pub http_ref_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub needs_equipment: Option<bool>,
    pub body_part_ids: Option<Vec<Uuid>>,
    pub http_ref_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct ExerciseListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub needs_equipment: Option<bool>,
    pub body_part_ids: Option<Vec<Uuid>>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub needs_equipment: bool,
    pub is_custom: bool,
    pub body_parts: Vec<BodyPart>,
    pub http_refs: Vec<HttpRefResponse>,
}

impl ExerciseResponse {
    fn assemble(row: Exercise, body_parts: Vec<BodyPart>, http_refs: Vec<HttpRefResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            needs_equipment: row.needs_equipment,
            is_custom: row.is_custom,
            body_parts,
            http_refs,
        }
    }
}

pub struct ExerciseService {
    pool: PgPool,
}

impl ExerciseService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: ExerciseCreateRequest,
    ) -> Result<ExerciseResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if request.body_part_ids.is_empty() {
            return Err(CatalogError::EmptyRequiredRelation("body_parts").into());
        }
        let body_parts = require_all(
            &request.body_part_ids,
            taxonomies::find_body_parts_by_ids(&mut *tx, &request.body_part_ids).await?,
        )?;
        let refs = require_all(
            &request.http_ref_ids,
            http_refs::find_by_ids(&mut *tx, &request.http_ref_ids).await?,
        )?;
        require_same_owner(&refs, user_id)?;

        if exercises::title_taken(&mut *tx, &request.title, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        // Join rows come from the resolved set, which is deduplicated.
        let body_part_ids: Vec<Uuid> = body_parts.iter().map(|b| b.id).collect();
        let http_ref_ids: Vec<Uuid> = refs.iter().map(|r| r.id).collect();

        let row = exercises::insert(
            &mut *tx,
            &NewExercise {
                title: request.title,
                description: request.description,
                needs_equipment: request.needs_equipment,
                user_id,
            },
        )
        .await?;
        exercises::replace_body_parts(&mut *tx, row.id, &body_part_ids).await?;
        exercises::add_http_refs(&mut *tx, row.id, &http_ref_ids).await?;
        tx.commit().await?;

        info!(exercise_id = %row.id, "created custom exercise");
        Ok(ExerciseResponse::assemble(
            row,
            body_parts,
            refs.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<ExerciseResponse, ServiceError> {
        let row = exercises::find_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        let mut responses = self.assemble_all(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn list_with_filter(&self, params: ExerciseListParams) -> Result<Page<ExerciseResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = ExerciseFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            title: params.title,
            description: params.description,
            needs_equipment: params.needs_equipment,
            body_part_ids: params.body_part_ids,
        };
        let rows = exercises::list(&self.pool, &filter, &order, &params.page).await?;
        let total = exercises::count(&self.pool, &filter).await?;
        let items = self.assemble_all(rows).await?;
        Ok(Page::new(items, &params.page, total))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: ExerciseUpdateRequest,
    ) -> Result<ExerciseResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = exercises::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        let new_body_parts = match &patch.body_part_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Err(CatalogError::EmptyRequiredRelation("body_parts").into());
                }
                let resolved = require_all(ids, taxonomies::find_body_parts_by_ids(&mut *tx, ids).await?)?;
                Some(resolved.iter().map(|b| b.id).collect::<Vec<Uuid>>())
            }
            None => None,
        };
        let new_http_refs = match &patch.http_ref_ids {
            Some(ids) => {
                let resolved = require_all(ids, http_refs::find_by_ids(&mut *tx, ids).await?)?;
                require_same_owner(&resolved, user_id)?;
                Some(resolved.iter().map(|r| r.id).collect::<Vec<Uuid>>())
            }
            None => None,
        };

        if let Some(title) = &patch.title {
            if title != &row.title && exercises::title_taken(&mut *tx, title, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = ExerciseChanges {
            title: differ.field("title", &row.title, patch.title.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
            needs_equipment: differ.field("needs_equipment", &row.needs_equipment, patch.needs_equipment.as_ref()),
        };
        if patch.body_part_ids.is_some() {
            differ.relation();
        }
        if patch.http_ref_ids.is_some() {
            differ.relation();
        }
        differ.finish()?;

        let updated = exercises::update(&mut *tx, id, &changes).await?;
        if let Some(body_part_ids) = &new_body_parts {
            exercises::replace_body_parts(&mut *tx, id, body_part_ids).await?;
        }
        if let Some(http_ref_ids) = &new_http_refs {
            exercises::clear_http_refs(&mut *tx, id).await?;
            exercises::add_http_refs(&mut *tx, id, http_ref_ids).await?;
        }
        let response = Self::assemble_one(&mut tx, updated).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = exercises::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        // Only the exercise row and its link rows go away; referenced body
        // parts and http refs are left untouched.
        exercises::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(exercise_id = %id, "deleted custom exercise");
        Ok(id)
    }

    async fn assemble_all(&self, rows: Vec<Exercise>) -> Result<Vec<ExerciseResponse>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|e| e.id).collect();
        let mut body_parts = group_by_parent(exercises::body_parts_for(&self.pool, &ids).await?);
        let mut refs = group_by_parent(exercises::http_refs_for(&self.pool, &ids).await?);
        Ok(rows
            .into_iter()
            .map(|row| {
                let parts = body_parts.remove(&row.id).unwrap_or_default();
                let row_refs = refs.remove(&row.id).unwrap_or_default();
                ExerciseResponse::assemble(row, parts, row_refs.into_iter().map(Into::into).collect())
            })
            .collect())
    }

    async fn assemble_one(conn: &mut PgConnection, row: Exercise) -> Result<ExerciseResponse, ServiceError> {
        let parts = exercises::body_parts_for(&mut *conn, &[row.id]).await?;
        let refs = exercises::http_refs_for(&mut *conn, &[row.id]).await?;
        Ok(ExerciseResponse::assemble(
            row,
            parts.into_iter().map(|l| l.item).collect(),
            refs.into_iter().map(|l| HttpRefResponse::from(l.item)).collect(),
        ))
    }
}
