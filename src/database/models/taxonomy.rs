use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shared taxonomy node referenced by exercises. Default-only: never owned,
/// never mutated through the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BodyPart {
    pub id: Uuid,
    pub name: String,
}

impl crate::catalog::Identified for BodyPart {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Kind of mental activity, e.g. MEDITATION or AFFIRMATION.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentalType {
    pub id: Uuid,
    pub name: String,
}

/// Kind of nutrition item, e.g. RECIPE or SUPPLEMENT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NutritionType {
    pub id: Uuid,
    pub name: String,
}
