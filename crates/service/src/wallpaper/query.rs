//! Listing parameters, parsed once into an immutable `WallpaperQuery`.

use serde::Deserialize;

use crate::pagination::Pagination;
use super::domain::Wallpaper;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Raw caller input, exactly as it arrives on the query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Record filter: category AND search, each optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WallpaperFilter {
    category: Option<String>,
    search: Option<String>,
}

impl WallpaperFilter {
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self { category, search }
    }

    pub fn category(&self) -> Option<&str> { self.category.as_deref() }

    pub fn search(&self) -> Option<&str> { self.search.as_deref() }

    pub fn is_empty(&self) -> bool { self.category.is_none() && self.search.is_none() }

    /// In-process evaluation, equivalent to the SQL predicate.
    pub fn matches(&self, w: &Wallpaper) -> bool {
        if let Some(c) = &self.category {
            if &w.category != c {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(s) => {
                let needle = s.to_lowercase();
                let hit = |text: &str| text.to_lowercase().contains(&needle);
                hit(&w.title)
                    || w.description.as_deref().is_some_and(hit)
                    || w.tags.iter().any(|t| hit(t))
            }
        }
    }

    /// `%text%` with `\`, `%` and `_` backslash-escaped, for `ILIKE`.
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|s| {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('%');
            for ch in s.chars() {
                if matches!(ch, '\\' | '%' | '_') {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('%');
            out
        })
    }
}

/// Validated listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WallpaperQuery {
    pagination: Pagination,
    filter: WallpaperFilter,
}

impl WallpaperQuery {
    pub fn new(pagination: Pagination, filter: WallpaperFilter) -> Self {
        Self { pagination: pagination.normalize(), filter }
    }

    /// Never fails: malformed paging values fall back to defaults.
    pub fn parse(params: &ListParams) -> Self {
        Self {
            pagination: Pagination::from_raw(params.page.as_deref(), params.limit.as_deref()),
            filter: WallpaperFilter::new(params.category.as_deref(), params.search.as_deref()),
        }
    }

    pub fn page(&self) -> u64 { self.pagination.page }

    pub fn limit(&self) -> u64 { self.pagination.per_page }

    pub fn offset(&self) -> u64 { self.pagination.offset() }

    pub fn filter(&self) -> &WallpaperFilter { &self.filter }

    pub fn total_pages(&self, total: u64) -> u64 { self.pagination.total_pages(total) }
}
