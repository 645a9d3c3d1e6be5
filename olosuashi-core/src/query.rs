use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Pagination and filters for list pages. Lives entirely in the URL query
/// string, so parsing and rendering must round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            category: None,
        }
    }
}

impl ListQuery {
    /// Lenient parse: malformed or out-of-range values fall back to defaults,
    /// unknown keys are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "page" => {
                    parsed.page = value.parse().ok().filter(|p| *p >= 1).unwrap_or(1);
                }
                "limit" => {
                    parsed.limit = value
                        .parse()
                        .ok()
                        .filter(|l| *l >= 1)
                        .map(|l: u32| l.min(MAX_PAGE_SIZE))
                        .unwrap_or(DEFAULT_PAGE_SIZE);
                }
                "search" => parsed.search = non_empty(value),
                "category" => {
                    parsed.category = non_empty(value).filter(|c| !c.eq_ignore_ascii_case("all"));
                }
                _ => {}
            }
        }

        parsed
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self { page: page.max(1), ..self.clone() }
    }

    /// Changing a filter always resets to the first page.
    pub fn with_search(&self, search: Option<&str>) -> Self {
        Self {
            page: 1,
            search: search.and_then(|s| non_empty(s.trim())),
            ..self.clone()
        }
    }

    pub fn with_category(&self, category: Option<&str>) -> Self {
        Self {
            page: 1,
            category: category
                .and_then(|c| non_empty(c.trim()))
                .filter(|c| !c.eq_ignore_ascii_case("all")),
            ..self.clone()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
