//! Paged list queries shared by every catalog endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_order() -> i32 {
    -1
}

/// Query-string shape: `?page=1&limit=10&query=fresh&sort=createdAt&order=-1`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Case-insensitive substring filter over the listing's name field.
    #[serde(default)]
    pub query: String,
    pub sort: Option<String>,
    /// `-1` newest-first (default), `1` ascending.
    #[serde(default = "default_order")]
    pub order: i32,
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            query: String::new(),
            sort: None,
            order: default_order(),
        }
    }
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.limit()
    }

    pub fn descending(&self) -> bool {
        self.order < 0
    }
}

/// One page of results plus the counters a paginated UI needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let limit = query.limit();
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as u64).div_ceil(limit as u64)) as u32
        };
        Page {
            items,
            total,
            page: query.page(),
            limit,
            total_pages,
        }
    }
}
