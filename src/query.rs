// Pagination helpers shared by the admin listing endpoints

use serde::{Deserialize, Serialize};

/// Query parameters accepted by every paginated listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 500;

    /// Page number, clamped to >= 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to 1..=500.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    /// SQL offset for the current page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Paginated response envelope.
///
/// `total` counts the rows matching the listing's filters, not the whole
/// table, so `pages` is accurate for filtered listings.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            items,
            total,
            page: params.page(),
            limit,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_parameters_are_absent() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(10_000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), PaginationParams::MAX_LIMIT);

        let params = PaginationParams {
            page: Some(-3),
            limit: Some(0),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(25),
        };
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn pages_round_up() {
        let params = PaginationParams {
            page: Some(1),
            limit: Some(20),
        };
        assert_eq!(Paginated::<()>::new(vec![], 0, &params).pages, 0);
        assert_eq!(Paginated::<()>::new(vec![], 1, &params).pages, 1);
        assert_eq!(Paginated::<()>::new(vec![], 20, &params).pages, 1);
        assert_eq!(Paginated::<()>::new(vec![], 21, &params).pages, 2);
    }
}
