pub mod auth;
pub mod body_parts;
pub mod exercises;
pub mod http_refs;
pub mod mentals;
pub mod nutritions;
pub mod workouts;

use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::filter::{PageRequest, SortDirection, SortSpec};

/// Sort parameters with a per-domain default field; direction defaults to
/// ascending.
pub(crate) fn sort_spec(
    sort_field: Option<String>,
    sort_direction: Option<String>,
    default_field: &str,
) -> Result<SortSpec, ApiError> {
    let direction = match sort_direction {
        Some(raw) => SortDirection::parse(&raw).map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => SortDirection::Asc,
    };
    Ok(SortSpec {
        field: sort_field.unwrap_or_else(|| default_field.to_string()),
        direction,
    })
}

pub(crate) fn page_request(page_number: Option<i32>, page_size: Option<i32>) -> Result<PageRequest, ApiError> {
    let size = page_size.unwrap_or(config::config().api.default_page_size);
    PageRequest::new(page_number.unwrap_or(0), size).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Comma-separated id lists in query strings, e.g. `body_part_ids=a,b,c`.
pub(crate) fn parse_id_list(raw: Option<String>, field: &str) -> Result<Option<Vec<Uuid>>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part
            .parse::<Uuid>()
            .map_err(|_| ApiError::bad_request(format!("Invalid id in {}: {}", field, part)))?;
        ids.push(id);
    }
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parses_and_trims() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_id_list(Some(format!("{}, {}", a, b)), "body_part_ids").unwrap().unwrap();
        assert_eq!(parsed, vec![a, b]);
    }

    #[test]
    fn id_list_rejects_garbage() {
        assert!(parse_id_list(Some("not-a-uuid".into()), "body_part_ids").is_err());
        assert!(parse_id_list(None, "body_part_ids").unwrap().is_none());
    }

    #[test]
    fn sort_spec_falls_back_to_domain_default() {
        let spec = sort_spec(None, None, "title").unwrap();
        assert_eq!(spec.field, "title");
        assert_eq!(spec.direction, SortDirection::Asc);
        assert!(sort_spec(None, Some("sideways".into()), "title").is_err());
    }
}
