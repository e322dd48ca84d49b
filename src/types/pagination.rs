//! Pagination types for list endpoints.

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination parameters for repository queries (zero-indexed pages)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub size: u64,
}

impl PaginationParams {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Get the effective page size, clamped to [1, MAX_PAGE_SIZE]
    pub fn limit(&self) -> u64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of query results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-indexed page number
    pub page: u64,
    /// Effective page size used by the query
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Convert the items while keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
