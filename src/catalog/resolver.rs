use std::collections::BTreeSet;

use uuid::Uuid;

use super::error::CatalogError;
use super::ownership::Owned;

pub trait Identified {
    fn id(&self) -> Uuid;
}

/// Verify that a batch fetch resolved every requested id.
///
/// The repository fetches all rows matching the id list in one query;
/// resolution fails as a whole when any id is missing, with no indication of
/// partial success. The resolved rows come back sorted ascending by id, the
/// order responses expose relations in.
pub fn require_all<R: Identified>(requested: &[Uuid], found: Vec<R>) -> Result<Vec<R>, CatalogError> {
    let wanted: BTreeSet<Uuid> = requested.iter().copied().collect();
    if found.len() != wanted.len() {
        return Err(CatalogError::InvalidNestedObject);
    }
    let mut found = found;
    found.sort_by_key(|r| r.id());
    Ok(found)
}

/// Ownership propagation across the reference graph: a referenced
/// sub-resource may be default, or custom and owned by the same user. Expects
/// `refs` sorted ascending by id so the lowest offending id wins.
pub fn require_same_owner<R: Identified + Owned>(refs: &[R], user_id: Uuid) -> Result<(), CatalogError> {
    for r in refs {
        if r.is_custom() && r.owner_id() != Some(user_id) {
            tracing::debug!(offending_id = %r.id(), "referenced custom sub-resource owned by another user");
            return Err(CatalogError::OwnershipMismatch);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Rec {
        id: Uuid,
        is_custom: bool,
        owner_id: Option<Uuid>,
    }

    impl Identified for Rec {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    impl Owned for Rec {
        fn is_custom(&self) -> bool {
            self.is_custom
        }
        fn owner_id(&self) -> Option<Uuid> {
            self.owner_id
        }
    }

    fn default_rec(id: Uuid) -> Rec {
        Rec { id, is_custom: false, owner_id: None }
    }

    fn custom_rec(id: Uuid, owner: Uuid) -> Rec {
        Rec { id, is_custom: true, owner_id: Some(owner) }
    }

    #[test]
    fn empty_id_list_resolves_to_empty() {
        let resolved = require_all::<Rec>(&[], vec![]).unwrap();
        assert!(resolved.is_empty());
    }

    #[test]
    fn any_missing_id_fails_the_whole_resolution() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let found = vec![default_rec(a)];
        assert_eq!(require_all(&[a, b], found), Err(CatalogError::InvalidNestedObject));
    }

    #[test]
    fn duplicate_requested_ids_resolve_once() {
        let a = Uuid::new_v4();
        let resolved = require_all(&[a, a], vec![default_rec(a)]).unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn resolved_rows_are_sorted_by_id() {
        let mut ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let found: Vec<Rec> = ids.iter().rev().map(|&id| default_rec(id)).collect();
        let resolved = require_all(&ids, found).unwrap();
        ids.sort();
        let resolved_ids: Vec<Uuid> = resolved.iter().map(|r| r.id).collect();
        assert_eq!(resolved_ids, ids);
    }

    #[test]
    fn defaults_are_always_allowed() {
        let user = Uuid::new_v4();
        let refs = vec![default_rec(Uuid::new_v4()), custom_rec(Uuid::new_v4(), user)];
        assert_eq!(require_same_owner(&refs, user), Ok(()));
    }

    #[test]
    fn foreign_custom_reference_is_a_mismatch() {
        let user = Uuid::new_v4();
        let refs = vec![custom_rec(Uuid::new_v4(), Uuid::new_v4())];
        assert_eq!(require_same_owner(&refs, user), Err(CatalogError::OwnershipMismatch));
    }
}
