use serde::{Deserialize, Serialize};

use super::error::FilterError;
use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FilterError> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidSortDirection(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Validated, bounded page window.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page_number: i32,
    pub page_size: i32,
}

impl PageRequest {
    /// `page_number` is zero-based; `page_size` must be positive and is
    /// capped by `api.max_page_size`.
    pub fn new(page_number: i32, page_size: i32) -> Result<Self, FilterError> {
        if page_number < 0 || page_size <= 0 {
            return Err(FilterError::InvalidPage);
        }
        let max = config::config().api.max_page_size;
        if page_size > max {
            return Err(FilterError::InvalidPage);
        }
        Ok(Self { page_number, page_size })
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        self.page_number as i64 * self.page_size as i64
    }
}

/// One page of query results plus the window it was cut from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: i32,
    pub page_size: i32,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        Self {
            items,
            page_number: request.page_number,
            page_size: request.page_size,
            total_elements,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_case_insensitively() {
        assert_eq!(SortDirection::parse("asc").unwrap(), SortDirection::Asc);
        assert_eq!(SortDirection::parse("DESC").unwrap(), SortDirection::Desc);
        assert!(SortDirection::parse("sideways").is_err());
    }

    #[test]
    fn page_request_validates_bounds() {
        assert!(PageRequest::new(-1, 10).is_err());
        assert!(PageRequest::new(0, 0).is_err());
        let req = PageRequest::new(2, 25).unwrap();
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn page_maps_items_and_keeps_window() {
        let req = PageRequest::new(1, 2).unwrap();
        let page = Page::new(vec![1, 2], &req, 5);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.page_number, 1);
        assert_eq!(mapped.total_elements, 5);
    }
}
