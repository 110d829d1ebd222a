use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::catalog::{validate_access, AccessMode, CatalogError, Differ, Visibility};
use crate::database::manager::DatabaseManager;
use crate::database::models::http_ref::HttpRef;
use crate::database::repository::http_refs::{self, HttpRefChanges, HttpRefFilter, NewHttpRef};
use crate::filter::{order_clause, Page, PageRequest, SortSpec};

const SORT_FIELDS: &[&str] = &["id", "name", "description", "created_at"];

#[derive(Debug, Deserialize)]
pub struct HttpRefCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub r#ref: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpRefUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub r#ref: Option<String>,
}

#[derive(Debug)]
pub struct HttpRefListParams {
    pub is_custom: Option<bool>,
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort: SortSpec,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpRefResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub r#ref: String,
    pub is_custom: bool,
}

impl From<HttpRef> for HttpRefResponse {
    fn from(row: HttpRef) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            r#ref: row.r#ref,
            is_custom: row.is_custom,
        }
    }
}

pub struct HttpRefService {
    pool: PgPool,
}

impl HttpRefService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self { pool: DatabaseManager::pool().await? })
    }

    pub async fn create_custom(
        &self,
        user_id: Uuid,
        request: HttpRefCreateRequest,
    ) -> Result<HttpRefResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if http_refs::name_taken(&mut *tx, &request.name, user_id, None).await? {
            return Err(CatalogError::DuplicateName.into());
        }

        let row = http_refs::insert(
            &mut *tx,
            &NewHttpRef {
                name: request.name,
                description: request.description,
                ref_value: request.r#ref,
                user_id,
            },
        )
        .await?;
        tx.commit().await?;

        info!(http_ref_id = %row.id, "created custom http ref");
        Ok(row.into())
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        visibility: Visibility,
        user_id: Option<Uuid>,
    ) -> Result<HttpRefResponse, ServiceError> {
        let row = http_refs::find_by_id(&self.pool, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, visibility, user_id, AccessMode::Read)?;
        Ok(row.into())
    }

    pub async fn list_with_filter(&self, params: HttpRefListParams) -> Result<Page<HttpRefResponse>, ServiceError> {
        let order = order_clause(SORT_FIELDS, &params.sort)?;
        let filter = HttpRefFilter {
            is_custom: params.is_custom,
            user_id: params.user_id,
            name: params.name,
            description: params.description,
        };
        let rows = http_refs::list(&self.pool, &filter, &order, &params.page).await?;
        let total = http_refs::count(&self.pool, &filter).await?;
        Ok(Page::new(rows, &params.page, total).map(HttpRefResponse::from))
    }

    pub async fn update_custom(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: HttpRefUpdateRequest,
    ) -> Result<HttpRefResponse, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = http_refs::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        if let Some(name) = &patch.name {
            if name != &row.name && http_refs::name_taken(&mut *tx, name, user_id, Some(row.id)).await? {
                return Err(CatalogError::DuplicateName.into());
            }
        }

        let mut differ = Differ::new();
        let changes = HttpRefChanges {
            name: differ.field("name", &row.name, patch.name.as_ref()),
            description: differ.optional_field("description", &row.description, patch.description.as_ref()),
            ref_value: differ.field("ref", &row.r#ref, patch.r#ref.as_ref()),
        };
        differ.finish()?;

        let updated = http_refs::update(&mut *tx, id, &changes).await?;
        tx.commit().await?;

        Ok(updated.into())
    }

    pub async fn delete_custom(&self, user_id: Uuid, id: Uuid) -> Result<Uuid, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let row = http_refs::find_by_id(&mut *tx, id).await?.ok_or(CatalogError::NotFound)?;
        validate_access(&row, Visibility::Custom, Some(user_id), AccessMode::Mutate)?;

        http_refs::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(http_ref_id = %id, "deleted custom http ref");
        Ok(id)
    }
}
