//! Offset pagination shared by list use-cases.

use serde::{Deserialize, Serialize};

/// Normalized page request (1-based page, bounded limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Applies defaults and bounds: page `0`/`None` becomes 1, limit
    /// `0`/`None` becomes `default_limit`, and limit is capped at `max_limit`.
    pub fn normalize(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let page = match page {
            Some(0) | None => 1,
            Some(value) => value,
        };
        let limit = match limit {
            Some(0) | None => default_limit,
            Some(value) if value > max_limit => max_limit,
            Some(value) => value,
        };
        Self { page, limit }
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Pagination metadata returned next to list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, Pagination};

    #[test]
    fn normalize_applies_defaults_and_caps() {
        assert_eq!(
            PageRequest::normalize(None, None, 10, 100),
            PageRequest { page: 1, limit: 10 }
        );
        assert_eq!(
            PageRequest::normalize(Some(0), Some(0), 50, 200),
            PageRequest { page: 1, limit: 50 }
        );
        assert_eq!(PageRequest::normalize(Some(3), Some(1000), 10, 100).limit, 100);
    }

    #[test]
    fn pages_round_up() {
        let request = PageRequest::normalize(Some(2), Some(10), 10, 100);
        assert_eq!(request.offset(), 10);
        assert_eq!(Pagination::new(request, 21).pages, 3);
        assert_eq!(Pagination::new(request, 0).pages, 0);
    }
}
