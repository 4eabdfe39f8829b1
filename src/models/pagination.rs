//! Pagination query parameters and paged response envelope

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{author::AuthorDto, book::BookDto, borrow_record::BorrowRecordDto, patron::PatronDto};
use crate::config::LibraryConfig;

/// Raw `page` / `pageSize` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 10)
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn resolve(&self, library: &LibraryConfig) -> Pagination {
        Pagination::new(
            self.page,
            self.page_size,
            library.default_page_size,
            library.max_page_size,
        )
    }
}

/// Normalized page request: `page >= 1`, `1 <= page_size <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: i64, max_size: i64) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s >= 1)
            .unwrap_or(default_size)
            .min(max_size.max(1));
        Self { page, page_size }
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Paged response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(
    PagedBooks = PagedResult<BookDto>,
    PagedAuthors = PagedResult<AuthorDto>,
    PagedPatrons = PagedResult<PatronDto>,
    PagedBorrowRecords = PagedResult<BorrowRecordDto>
)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total_count: i64) -> Self {
        let total_pages = if total_count <= 0 {
            0
        } else {
            (total_count + pagination.page_size - 1) / pagination.page_size
        };
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total_count,
            total_pages,
        }
    }

    /// Convert the item type, keeping the page metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None, 10, 100);
        assert_eq!(p, Pagination { page: 1, page_size: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let p = Pagination::new(Some(0), Some(-5), 10, 100);
        assert_eq!(p, Pagination { page: 1, page_size: 10 });
    }

    #[test]
    fn test_page_size_is_capped() {
        let p = Pagination::new(Some(2), Some(1000), 10, 100);
        assert_eq!(p.page_size, 100);
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn test_skip_is_previous_pages() {
        let p = Pagination::new(Some(3), Some(7), 10, 100);
        assert_eq!(p.offset(), 14);
        assert_eq!(p.limit(), 7);
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::new(Some(1), Some(10), 10, 100);
        assert_eq!(PagedResult::<i32>::new(vec![], p, 0).total_pages, 0);
        assert_eq!(PagedResult::<i32>::new(vec![], p, 10).total_pages, 1);
        assert_eq!(PagedResult::<i32>::new(vec![], p, 11).total_pages, 2);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let p = Pagination::new(Some(2), Some(2), 10, 100);
        let paged = PagedResult::new(vec![1, 2], p, 5).map(|n| n * 10);
        assert_eq!(paged.items, vec![10, 20]);
        assert_eq!(paged.page, 2);
        assert_eq!(paged.total_count, 5);
        assert_eq!(paged.total_pages, 3);
    }
}
