//! Optional page-number pagination for list endpoints
//!
//! Without `page` a list endpoint returns a plain JSON array; with it, an
//! envelope carrying the filtered total.

use serde::Serialize;

use crate::db::Listing;

/// Maximum items per page
const MAX_PAGE_SIZE: u32 = 100;

/// Default items per page
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub page_size: u32,
}

impl Pagination {
    /// Create pagination with clamping.
    ///
    /// - Page is clamped to minimum of 1
    /// - Page size is clamped to 1..=100
    pub fn new(page: u32, page_size: Option<u32>) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Apply this page to an already filtered and ordered collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Total count across all pages
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

/// Body of a list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Plain(Vec<T>),
    Paged(Paginated<T>),
}

/// Requested page lies beyond the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPage(pub u32);

impl<T> ListBody<T> {
    pub fn new(listing: Listing<T>, page: Option<Pagination>) -> Result<Self, InvalidPage> {
        match page {
            None => Ok(Self::Plain(listing.items)),
            Some(p) => {
                if listing.items.is_empty() && p.page > 1 {
                    return Err(InvalidPage(p.page));
                }
                Ok(Self::Paged(Paginated {
                    count: listing.total,
                    page: p.page,
                    page_size: p.page_size,
                    results: listing.items,
                }))
            }
        }
    }
}
