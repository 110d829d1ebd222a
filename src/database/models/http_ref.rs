use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// http_refs keeps both default and custom references to external material
/// (articles, videos). user_id is set only for custom rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HttpRef {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "ref")]
    pub r#ref: String,
    pub is_custom: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

super::catalog_record!(HttpRef);
