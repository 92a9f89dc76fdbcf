//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.
//! Raw query-string values are accepted as-is; anything that does not parse
//! to a positive integer falls back to the default for that field.

pub const DEFAULT_PER_PAGE: u64 = 12;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    /// Build from optional raw strings such as `?page=2&limit=abc`.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        let d = Self::default();
        Self {
            page: parse_positive(page).unwrap_or(d.page),
            per_page: parse_positive(per_page).unwrap_or(d.per_page),
        }
        .normalize()
    }

    /// Zero page or limit falls back to the defaults
    pub fn normalize(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = if self.per_page == 0 { DEFAULT_PER_PAGE } else { self.per_page };
        Self { page, per_page }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// `ceil(total / per_page)`; 0 when there is nothing to show.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PER_PAGE } }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}
