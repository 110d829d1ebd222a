pub mod error;
pub mod types;

pub use error::FilterError;
pub use types::{Page, PageRequest, SortDirection, SortSpec};

/// Build a deterministic ORDER BY clause from a caller-supplied sort spec.
///
/// The sort field must appear in the per-domain whitelist; anything else is
/// rejected before it can reach SQL. A secondary sort on `id` keeps paging
/// stable when the primary field has duplicates.
pub fn order_clause(allowed: &[&str], spec: &SortSpec) -> Result<String, FilterError> {
    if !allowed.contains(&spec.field.as_str()) {
        return Err(FilterError::InvalidSortField(spec.field.clone()));
    }
    if spec.field == "id" {
        return Ok(format!("ORDER BY \"id\" {}", spec.direction.to_sql()));
    }
    Ok(format!("ORDER BY \"{}\" {}, \"id\" ASC", spec.field, spec.direction.to_sql()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["id", "title", "description", "created_at"];

    #[test]
    fn builds_clause_with_id_tiebreak() {
        let spec = SortSpec { field: "title".into(), direction: SortDirection::Desc };
        assert_eq!(order_clause(ALLOWED, &spec).unwrap(), "ORDER BY \"title\" DESC, \"id\" ASC");
    }

    #[test]
    fn id_sort_needs_no_tiebreak() {
        let spec = SortSpec { field: "id".into(), direction: SortDirection::Asc };
        assert_eq!(order_clause(ALLOWED, &spec).unwrap(), "ORDER BY \"id\" ASC");
    }

    #[test]
    fn rejects_unlisted_field() {
        let spec = SortSpec { field: "password_hash; --".into(), direction: SortDirection::Asc };
        assert!(matches!(order_clause(ALLOWED, &spec), Err(FilterError::InvalidSortField(_))));
    }
}
