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
use crate::database::models::nutrition::Nutrition;
use crate::database::repository::{
    group_by_parent, http_refs,
    nutritions::{self, NewNutrition, NutritionChanges, NutritionFilter},
    taxonomies,
};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "title", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct NutritionCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub nutrition_type_id: Uuid,
    #[serde(default)]
    pub http_ref_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NutritionUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub nutrition_type_id: Option<Uuid>,
    pub http_ref_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct NutritionListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub nutrition_type_id: Option<Uuid>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct NutritionResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub nutrition_type_id: Uuid,
    pub is_custom: bool,
    pub http_refs: Vec<HttpRefResponse>,
}

impl NutritionResponse {
    fn assemble(row: Nutrition, http_refs: Vec<HttpRefResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            nutrition_type_id: row.nutrition_type_id,
            is_custom: row.is_custom,
            http_refs,
        }
    }
}

pub struct NutritionService {
    pool: PgPool,
}

impl NutritionService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: NutritionCreateRequest,
    ) -> Result<NutritionResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        taxonomies::find_nutrition_type_by_id(&mut *tx, request.nutrition_type_id)
            .await?
            .ok_or(CatalogError::InvalidNestedObject)?;
        let refs = require_all(
            &request.http_ref_ids,
            http_refs::find_by_ids(&mut *tx, &request.http_ref_ids).await?,
        )?;
        require_same_owner(&refs, user_id)?;

        if nutritions::title_taken(&mut *tx, &request.title, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        // Join rows come from the resolved set, which is deduplicated.
        let http_ref_ids: Vec<Uuid> = refs.iter().map(|r| r.id).collect();

        let row = nutritions::insert(
            &mut *tx,
            &NewNutrition {
                title: request.title,
                description: request.description,
                nutrition_type_id: request.nutrition_type_id,
                user_id,
            },
        )
        .await?;
        nutritions::add_http_refs(&mut *tx, row.id, &http_ref_ids).await?;
        tx.commit().await?;

        info!(nutrition_id = %row.id, "created custom nutrition item");
        Ok(NutritionResponse::assemble(
            row,
            refs.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<NutritionResponse, ServiceError> {
        let row = nutritions::find_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        let mut responses = self.assemble_all(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn list_with_filter(&self, params: NutritionListParams) -> Result<Page<NutritionResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = NutritionFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            title: params.title,
            description: params.description,
            nutrition_type_id: params.nutrition_type_id,
        };
        let rows = nutritions::list(&self.pool, &filter, &order, &params.page).await?;
        let total = nutritions::count(&self.pool, &filter).await?;
        let items = self.assemble_all(rows).await?;
        Ok(Page::new(items, &params.page, total))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: NutritionUpdateRequest,
    ) -> Result<NutritionResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = nutritions::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        if let Some(nutrition_type_id) = patch.nutrition_type_id {
            if nutrition_type_id != row.nutrition_type_id {
                taxonomies::find_nutrition_type_by_id(&mut *tx, nutrition_type_id)
                    .await?
                    .ok_or(CatalogError::InvalidNestedObject)?;
            }
        }
        let new_http_refs = match &patch.http_ref_ids {
            Some(ids) => {
                let resolved = require_all(ids, http_refs::find_by_ids(&mut *tx, ids).await?)?;
                require_same_owner(&resolved, user_id)?;
                Some(resolved.iter().map(|r| r.id).collect::<Vec<Uuid>>())
            }
            None => None,
        };

        if let Some(title) = &patch.title {
            if title != &row.title && nutritions::title_taken(&mut *tx, title, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = NutritionChanges {
            title: differ.field("title", &row.title, patch.title.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
            nutrition_type_id: differ.field("nutrition_type_id", &row.nutrition_type_id, patch.nutrition_type_id.as_ref()),
        };
        if patch.http_ref_ids.is_some() {
            differ.relation();
        }
        differ.finish()?;

        let updated = nutritions::update(&mut *tx, id, &changes).await?;
        if let Some(http_ref_ids) = &new_http_refs {
            nutritions::clear_http_refs(&mut *tx, id).await?;
            nutritions::add_http_refs(&mut *tx, id, http_ref_ids).await?;
        }
        let response = Self::assemble_one(&mut tx, updated).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = nutritions::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        nutritions::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(nutrition_id = %id, "deleted custom nutrition item");
        Ok(id)
    }

    async fn assemble_all(&self, rows: Vec<Nutrition>) -> Result<Vec<NutritionResponse>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|n| n.id).collect();
        let mut refs = group_by_parent(nutritions::http_refs_for(&self.pool, &ids).await?);
        Ok(rows
            .into_iter()
            .map(|row| {
                let row_refs = refs.remove(&row.id).unwrap_or_default();
                NutritionResponse::assemble(row, row_refs.into_iter().map(Into::into).collect())
            })
            .collect())
    }

    async fn assemble_one(conn: &mut PgConnection, row: Nutrition) -> Result<NutritionResponse, ServiceError> {
        let refs = nutritions::http_refs_for(&mut *conn, &[row.id]).await?;
        Ok(NutritionResponse::assemble(
            row,
            refs.into_iter().map(|l| HttpRefResponse::from(l.item)).collect(),
        ))
    }
}
