use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentalActivity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub mental_type_id: Uuid,
    pub is_custom: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

super::catalog_record!(MentalActivity);

/// A mental workout groups one or more mental activities, the way a workout
/// groups exercises.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentalWorkout {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_custom: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

super::catalog_record!(MentalWorkout);
