pub mod exercise;
pub mod http_ref;
pub mod mental;
pub mod nutrition;
pub mod taxonomy;
pub mod user;
pub mod workout;

/// Wire a row struct with `id`, `is_custom` and `user_id` columns into the
/// catalog access rules.
macro_rules! catalog_record {
    ($row:ty) => {
        impl crate::catalog::Identified for $row {
            fn id(&self) -> uuid::Uuid {
                self.id
            }
        }

        impl crate::catalog::Owned for $row {
            fn is_custom(&self) -> bool {
                self.is_custom
            }
            fn owner_id(&self) -> Option<uuid::Uuid> {
                self.user_id
            }
        }
    };
}

pub(crate) use catalog_record;
