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
use crate::database::models::mental::MentalActivity;
use crate::database::repository::{
    group_by_parent, http_refs,
    mentals::{self, MentalActivityChanges, MentalActivityFilter, NewMentalActivity},
    taxonomies,
};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "title", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct MentalActivityCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
    #[serde(default)]
    pub http_ref_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MentalActivityUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub mental_type_id: Option<Uuid>,
    pub http_ref_ids: Option<Vec<Uuid>>,
}

#[derive(Debug)]
pub struct MentalActivityListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub mental_type_id: Option<Uuid>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentalActivityResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
    pub is_custom: bool,
    pub http_refs: Vec<HttpRefResponse>,
}

impl MentalActivityResponse {
    fn assemble(row: MentalActivity, http_refs: Vec<HttpRefResponse>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            mental_type_id: row.mental_type_id,
            is_custom: row.is_custom,
            http_refs,
        }
    }
}

pub struct MentalActivityService {
    pool: PgPool,
}

impl MentalActivityService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: MentalActivityCreateRequest,
    ) -> Result<MentalActivityResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        taxonomies::find_mental_type_by_id(&mut *tx, request.mental_type_id)
            .await?
            .ok_or(CatalogError::InvalidNestedObject)?;
        let refs = require_all(
            &request.http_ref_ids,
            http_refs::find_by_ids(&mut *tx, &request.http_ref_ids).await?,
        )?;
        require_same_owner(&refs, user_id)?;

        if mentals::activity_title_taken(&mut *tx, &request.title, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        // Join rows come from the resolved set, which is deduplicated.
        let http_ref_ids: Vec<Uuid> = refs.iter().map(|r| r.id).collect();

        let row = mentals::insert_activity(
            &mut *tx,
            &NewMentalActivity {
                title: request.title,
                description: request.description,
                mental_type_id: request.mental_type_id,
                user_id,
            },
        )
        .await?;
        mentals::add_activity_http_refs(&mut *tx, row.id, &http_ref_ids).await?;
        tx.commit().await?;

        info!(mental_activity_id = %row.id, "created custom mental activity");
        Ok(MentalActivityResponse::assemble(
            row,
            refs.into_iter().map(Into::into).collect(),
        ))
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<MentalActivityResponse, ServiceError> {
        let row = mentals::find_activity_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        let mut responses = self.assemble_all(vec![row]).await?;
        Ok(responses.remove(0))
    }

    pub async fn list_with_filter(
        &self,
        params: MentalActivityListParams,
    ) -> Result<Page<MentalActivityResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = MentalActivityFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            title: params.title,
            description: params.description,
            mental_type_id: params.mental_type_id,
        };
        let rows = mentals::list_activities(&self.pool, &filter, &order, &params.page).await?;
        let total = mentals::count_activities(&self.pool, &filter).await?;
        let items = self.assemble_all(rows).await?;
        Ok(Page::new(items, &params.page, total))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: MentalActivityUpdateRequest,
    ) -> Result<MentalActivityResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = mentals::find_activity_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        if let Some(mental_type_id) = patch.mental_type_id {
            if mental_type_id != row.mental_type_id {
                taxonomies::find_mental_type_by_id(&mut *tx, mental_type_id)
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
            if title != &row.title && mentals::activity_title_taken(&mut *tx, title, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = MentalActivityChanges {
            title: differ.field("title", &row.title, patch.title.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
            mental_type_id: differ.field("mental_type_id", &row.mental_type_id, patch.mental_type_id.as_ref()),
        };
        if patch.http_ref_ids.is_some() {
            differ.relation();
        }
        differ.finish()?;

        let updated = mentals::update_activity(&mut *tx, id, &changes).await?;
        if let Some(http_ref_ids) = &new_http_refs {
            mentals::clear_activity_http_refs(&mut *tx, id).await?;
            mentals::add_activity_http_refs(&mut *tx, id, http_ref_ids).await?;
        }
        let response = Self::assemble_one(&mut tx, updated).await?;
        tx.commit().await?;

        Ok(response)
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = mentals::find_activity_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        mentals::delete_activity(&mut *tx, id).await?;
        tx.commit().await?;

        info!(mental_activity_id = %id, "deleted custom mental activity");
        Ok(id)
    }

    async fn assemble_all(&self, rows: Vec<MentalActivity>) -> Result<Vec<MentalActivityResponse>, ServiceError> {
        let ids: Vec<Uuid> = rows.iter().map(|a| a.id).collect();
        let mut refs = group_by_parent(mentals::http_refs_for_activities(&self.pool, &ids).await?);
        Ok(rows
            .into_iter()
            .map(|row| {
                let row_refs = refs.remove(&row.id).unwrap_or_default();
                MentalActivityResponse::assemble(row, row_refs.into_iter().map(Into::into).collect())
            })
            .collect())
    }

    async fn assemble_one(conn: &mut PgConnection, row: MentalActivity) -> Result<MentalActivityResponse, ServiceError> {
        let refs = mentals::http_refs_for_activities(&mut *conn, &[row.id]).await?;
        Ok(MentalActivityResponse::assemble(
            row,
            refs.into_iter().map(|l| HttpRefResponse::from(l.item)).collect(),
        ))
    }
}
