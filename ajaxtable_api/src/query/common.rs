//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] pagination
//! fields, and the reserved parameter names.

use url::Url;

/// Page number parameter (1-indexed).
pub const PAGE_PARAM: &str = "page";
/// Rows-per-page parameter.
pub const PER_PAGE_PARAM: &str = "per_page";
/// Transport flag asking the server for a partial payload instead of a full page.
pub const AJAX_PARAM: &str = "ajax";
/// Transport flag asking the server to include aggregate counters.
pub const INCLUDE_STATS_PARAM: &str = "include_stats";
/// Rows per page when neither the URL nor the caller says otherwise.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Trait implemented by query builders. Provides URL serialization and
/// shared builder methods for pagination.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the page number. Zero is clamped to the first page.
    fn with_page(mut self, page: u32) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page.max(1);
        self
    }

    /// Sets the number of rows per page. Zero is ignored.
    fn with_per_page(mut self, per_page: u32) -> Self
    where
        Self: Sized,
    {
        if per_page > 0 {
            self.get_common().per_page = per_page;
        }
        self
    }
}

/// Pagination fields shared by all queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryCommon {
    /// Page number (1-indexed). Never zero.
    pub page: u32,
    /// Rows per page. Never zero.
    pub per_page: u32,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl QueryCommon {
    /// Appends the pagination parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &self.page.to_string())
            .append_pair(PER_PAGE_PARAM, &self.per_page.to_string());
        url
    }
}

/// Returns `url` with its `page` parameter set to `page`, keeping every other
/// parameter and the path as they are. Appends the parameter when missing.
pub fn replace_page_param(url: &Url, page: u32) -> Url {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k == PAGE_PARAM {
                if replaced {
                    return None;
                }
                replaced = true;
                return Some((k.into_owned(), page.to_string()));
            }
            Some((k.into_owned(), v.into_owned()))
        })
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    {
        let mut serializer = out.query_pairs_mut();
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
        if !replaced {
            serializer.append_pair(PAGE_PARAM, &page.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_page_keeps_other_params_in_order() {
        let url = Url::parse("https://admin.test/orders?status=done&page=3&sort=desc").unwrap();
        let out = replace_page_param(&url, 7);
        assert_eq!(out.path(), "/orders");
        assert_eq!(out.query(), Some("status=done&page=7&sort=desc"));
    }

    #[test]
    fn replace_page_appends_when_missing() {
        let url = Url::parse("https://admin.test/orders").unwrap();
        let out = replace_page_param(&url, 2);
        assert_eq!(out.query(), Some("page=2"));
    }

    #[test]
    fn replace_page_collapses_duplicates() {
        let url = Url::parse("https://admin.test/orders?page=1&page=4").unwrap();
        let out = replace_page_param(&url, 5);
        assert_eq!(out.query(), Some("page=5"));
    }
}
