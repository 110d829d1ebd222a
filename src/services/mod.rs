pub mod exercise_service;
pub mod http_ref_service;
pub mod mental_activity_service;
pub mod mental_workout_service;
pub mod nutrition_service;
pub mod workout_service;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::database::manager::DatabaseError;
use crate::filter::FilterError;

pub use exercise_service::ExerciseService;
pub use http_ref_service::HttpRefService;
pub use mental_activity_service::MentalActivityService;
pub use mental_workout_service::MentalWorkoutService;
pub use nutrition_service::NutritionService;
pub use workout_service::WorkoutService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Catalog(err.into())
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        ServiceError::Catalog(err.into())
    }
}
