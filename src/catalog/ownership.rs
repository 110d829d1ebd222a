use uuid::Uuid;

use super::error::CatalogError;

/// Which flavor of a resource the caller addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Default,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Mutate,
}

/// Minimal view of a catalog record needed by the access rules.
pub trait Owned {
    fn is_custom(&self) -> bool;
    fn owner_id(&self) -> Option<Uuid>;
}

/// Decide whether `requesting_user` may access `record` as `requested`.
///
/// Mutations are only ever legal on a custom record owned by the requester;
/// a default record is rejected as immutable before anything else. For
/// reads, the addressed flavor must match the stored one, and a custom
/// record must belong to the requester.
pub fn validate_access<R: Owned>(
    record: &R,
    requested: Visibility,
    requesting_user: Option<Uuid>,
    mode: AccessMode,
) -> Result<(), CatalogError> {
    if mode == AccessMode::Mutate && !record.is_custom() {
        return Err(CatalogError::DefaultResourceImmutable);
    }

    match requested {
        Visibility::Default if record.is_custom() => {
            return Err(CatalogError::WrongVariantRequested { requested: Visibility::Default });
        }
        Visibility::Custom if !record.is_custom() => {
            return Err(CatalogError::WrongVariantRequested { requested: Visibility::Custom });
        }
        _ => {}
    }

    // An anonymous caller can never hold a custom record.
    if record.is_custom() && record.owner_id() != requesting_user {
        return Err(CatalogError::OwnershipMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rec {
        is_custom: bool,
        owner_id: Option<Uuid>,
    }

    impl Owned for Rec {
        fn is_custom(&self) -> bool {
            self.is_custom
        }
        fn owner_id(&self) -> Option<Uuid> {
            self.owner_id
        }
    }

    fn default_rec() -> Rec {
        Rec { is_custom: false, owner_id: None }
    }

    fn custom_rec(owner: Uuid) -> Rec {
        Rec { is_custom: true, owner_id: Some(owner) }
    }

    #[test]
    fn default_read_needs_no_user() {
        let rec = default_rec();
        assert_eq!(validate_access(&rec, Visibility::Default, None, AccessMode::Read), Ok(()));
    }

    #[test]
    fn custom_requested_as_default_is_rejected() {
        let owner = Uuid::new_v4();
        let rec = custom_rec(owner);
        assert_eq!(
            validate_access(&rec, Visibility::Default, Some(owner), AccessMode::Read),
            Err(CatalogError::WrongVariantRequested { requested: Visibility::Default })
        );
    }

    #[test]
    fn default_requested_as_custom_is_rejected() {
        let rec = default_rec();
        assert_eq!(
            validate_access(&rec, Visibility::Custom, Some(Uuid::new_v4()), AccessMode::Read),
            Err(CatalogError::WrongVariantRequested { requested: Visibility::Custom })
        );
    }

    #[test]
    fn owner_reads_own_custom() {
        let owner = Uuid::new_v4();
        let rec = custom_rec(owner);
        assert_eq!(validate_access(&rec, Visibility::Custom, Some(owner), AccessMode::Read), Ok(()));
    }

    #[test]
    fn other_user_is_mismatched() {
        let rec = custom_rec(Uuid::new_v4());
        assert_eq!(
            validate_access(&rec, Visibility::Custom, Some(Uuid::new_v4()), AccessMode::Read),
            Err(CatalogError::OwnershipMismatch)
        );
    }

    #[test]
    fn anonymous_caller_never_sees_custom() {
        let rec = custom_rec(Uuid::new_v4());
        assert_eq!(
            validate_access(&rec, Visibility::Custom, None, AccessMode::Read),
            Err(CatalogError::OwnershipMismatch)
        );
    }

    #[test]
    fn default_record_is_immutable_regardless_of_caller() {
        let rec = default_rec();
        assert_eq!(
            validate_access(&rec, Visibility::Custom, Some(Uuid::new_v4()), AccessMode::Mutate),
            Err(CatalogError::DefaultResourceImmutable)
        );
        assert_eq!(
            validate_access(&rec, Visibility::Custom, None, AccessMode::Mutate),
            Err(CatalogError::DefaultResourceImmutable)
        );
    }

    #[test]
    fn owner_mutates_own_custom() {
        let owner = Uuid::new_v4();
        let rec = custom_rec(owner);
        assert_eq!(validate_access(&rec, Visibility::Custom, Some(owner), AccessMode::Mutate), Ok(()));
    }

    #[test]
    fn other_user_cannot_mutate() {
        let rec = custom_rec(Uuid::new_v4());
        assert_eq!(
            validate_access(&rec, Visibility::Custom, Some(Uuid::new_v4()), AccessMode::Mutate),
            Err(CatalogError::OwnershipMismatch)
        );
    }
}
