use thiserror::Error;

use super::ownership::Visibility;

/// Failure taxonomy shared by all catalog services.
///
/// The display strings are part of the API contract: the HTTP boundary
/// forwards them verbatim and clients match on the literal text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Not found")]
    NotFound,

    /// A default resource was addressed through the custom endpoint or vice
    /// versa.
    #[error("{}", wrong_variant_message(.requested))]
    WrongVariantRequested { requested: Visibility },

    /// A custom resource (or a custom sub-resource it references) belongs to
    /// a different user than the requester.
    #[error("User-resource mismatch")]
    OwnershipMismatch,

    #[error("Default resource is not allowed to modify")]
    DefaultResourceImmutable,

    /// The name collides within {all defaults} ∪ {owner's customs}.
    #[error("Title duplicate")]
    DuplicateName,

    /// At least one referenced sub-resource id does not exist.
    #[error("Invalid nested object")]
    InvalidNestedObject,

    /// A relation the domain requires to be non-empty was supplied empty.
    #[error("Empty required relation: {0}")]
    EmptyRequiredRelation(&'static str),

    /// Every field of an update payload was absent.
    #[error("No updates requested")]
    NoUpdatesRequested,

    /// Supplied fields that are equal to the stored values, in evaluation
    /// order.
    #[error("Field values are not different: {}", .0.join(", "))]
    FieldsNotDifferent(Vec<&'static str>),

    /// Invariant violation, e.g. a seeded reference row is missing.
    #[error("Server error")]
    Server,
}

fn wrong_variant_message(requested: &Visibility) -> &'static str {
    match requested {
        Visibility::Default => "Custom resource has been requested instead of default",
        Visibility::Custom => "Default resource has been requested instead of custom",
    }
}

// Storage-level failures carry no actionable detail for the caller; log the
// real error and surface the generic taxonomy entry.
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error in catalog operation: {}", err);
        CatalogError::Server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(CatalogError::NotFound.to_string(), "Not found");
        assert_eq!(
            CatalogError::WrongVariantRequested { requested: Visibility::Default }.to_string(),
            "Custom resource has been requested instead of default"
        );
        assert_eq!(
            CatalogError::WrongVariantRequested { requested: Visibility::Custom }.to_string(),
            "Default resource has been requested instead of custom"
        );
        assert_eq!(CatalogError::OwnershipMismatch.to_string(), "User-resource mismatch");
        assert_eq!(
            CatalogError::DefaultResourceImmutable.to_string(),
            "Default resource is not allowed to modify"
        );
        assert_eq!(CatalogError::DuplicateName.to_string(), "Title duplicate");
        assert_eq!(CatalogError::InvalidNestedObject.to_string(), "Invalid nested object");
        assert_eq!(
            CatalogError::EmptyRequiredRelation("exercises").to_string(),
            "Empty required relation: exercises"
        );
        assert_eq!(CatalogError::NoUpdatesRequested.to_string(), "No updates requested");
        assert_eq!(CatalogError::Server.to_string(), "Server error");
    }

    #[test]
    fn not_different_fields_are_joined_in_order() {
        let err = CatalogError::FieldsNotDifferent(vec!["title", "description"]);
        assert_eq!(err.to_string(), "Field values are not different: title, description");
    }
}
