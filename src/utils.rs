use serde::{Deserialize, Serialize};

use crate::names;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `?page=&limit=` as sent by list endpoints. Missing or out-of-range values
/// fall back to sane defaults instead of failing the request.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn summary(&self, total: i64) -> Pagination {
        Pagination {
            current_page: self.page,
            total_pages: (total + self.limit - 1) / self.limit,
            total_items: total,
            items_per_page: self.limit,
        }
    }
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        Page {
            page: query
                .page
                .unwrap_or(1)
                .clamp(1, i64::MAX / names::MAX_PAGE_SIZE),
            limit: query
                .limit
                .unwrap_or(names::DEFAULT_PAGE_SIZE)
                .clamp(1, names::MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

/// Lower-case and trim an email so it can serve as a lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
