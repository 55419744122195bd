use url::Url;

use super::common::{
    Query, QueryCommon, AJAX_PARAM, INCLUDE_STATS_PARAM, PAGE_PARAM, PER_PAGE_PARAM,
};
use crate::Error;

/// Path segment that routes a list request to the filtered (search) endpoint.
pub const SEARCH_SEGMENT: &str = "advanced_search";

/// Query state of one list view: pagination plus free-form filters.
///
/// Whether the view is filtered is an explicit flag rather than something
/// re-detected on every request. It is set when a filter is applied (or when
/// the state is derived from a URL that already carries filters or the
/// search path marker) and cleared by [`ListQuery::clear_filters`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub common: QueryCommon,
    filters: Vec<(String, String)>,
    is_filtered: bool,
}

impl Query for ListQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        for (key, value) in self.filters.iter() {
            url.query_pairs_mut().append_pair(key, value);
        }
        url
    }
}

impl ListQuery {
    /// Derives the query state from a page URL.
    ///
    /// `page` and `per_page` fall back to 1 and `per_page` when missing or
    /// malformed. Transport flags are dropped. Empty filter values are
    /// ignored, and when `searchable` is non-empty only those keys are kept.
    pub fn from_url(url: &Url, per_page: u32, searchable: &[String]) -> Self {
        let mut query = ListQuery::default().with_per_page(per_page);
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PAGE_PARAM => {
                    if let Ok(page) = value.parse::<u32>() {
                        query.common.page = page.max(1);
                    }
                }
                PER_PAGE_PARAM => {
                    if let Ok(n) = value.parse::<u32>() {
                        query = query.with_per_page(n);
                    }
                }
                AJAX_PARAM | INCLUDE_STATS_PARAM => {}
                other => {
                    if value.is_empty() {
                        continue;
                    }
                    if !searchable.is_empty() && !searchable.iter().any(|s| s == other) {
                        tracing::debug!("Ignoring undeclared filter parameter {}", other);
                        continue;
                    }
                    query.set_filter(other, value.as_ref());
                }
            }
        }
        if has_search_segment(url) {
            query.is_filtered = true;
        }
        query
    }

    /// Adds or replaces a filter. An empty value removes the filter.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(key, value);
        self
    }

    /// Adds or replaces a filter in place. An empty value removes the filter.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.filters.retain(|(k, _)| *k != key);
            return;
        }
        match self.filters.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.filters.push((key, value)),
        }
        self.is_filtered = true;
    }

    /// Removes all filters and clears the filtered flag.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.is_filtered = false;
    }

    /// Forces the filtered flag on, e.g. when the page declares a search view.
    pub fn mark_filtered(&mut self) {
        self.is_filtered = true;
    }

    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    pub fn page(&self) -> u32 {
        self.common.page
    }

    pub fn per_page(&self) -> u32 {
        self.common.per_page
    }

    /// Filters in the order they were applied.
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Picks the list endpoint or its search variant under `base`.
    pub fn endpoint(&self, base: &Url) -> Result<Url, Error> {
        if !self.is_filtered || has_search_segment(base) {
            return Ok(base.clone());
        }
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .push(SEARCH_SEGMENT);
        Ok(url)
    }

    /// Rewrites the query string of `location` to describe this state. The
    /// path is left unchanged.
    pub fn to_location(&self, location: &Url) -> Url {
        let mut url = location.clone();
        url.set_query(None);
        self.add_to_url(&url)
    }
}

fn has_search_segment(url: &Url) -> bool {
    url.path_segments()
        .map(|mut segments| segments.any(|s| s == SEARCH_SEGMENT))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn from_url_reads_pagination_and_filters() {
        let q = ListQuery::from_url(
            &url("https://admin.test/orders?page=4&per_page=50&status=done&ajax=1"),
            20,
            &[],
        );
        assert_eq!(q.page(), 4);
        assert_eq!(q.per_page(), 50);
        assert_eq!(q.filters(), &[("status".to_string(), "done".to_string())]);
        assert!(q.is_filtered());
    }

    #[test]
    fn from_url_falls_back_on_bad_numbers() {
        let q = ListQuery::from_url(&url("https://admin.test/orders?page=abc&per_page=0"), 15, &[]);
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), 15);
        assert!(!q.is_filtered());
    }

    #[test]
    fn from_url_zero_page_is_first_page() {
        let q = ListQuery::from_url(&url("https://admin.test/orders?page=0"), 20, &[]);
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn from_url_respects_searchable_fields() {
        let searchable = vec!["keyword".to_string()];
        let q = ListQuery::from_url(
            &url("https://admin.test/users?keyword=li&tab=drivers&keyword2="),
            20,
            &searchable,
        );
        assert_eq!(q.filters().len(), 1);
        assert_eq!(q.filter("keyword"), Some("li"));
        assert_eq!(q.filter("tab"), None);
    }

    #[test]
    fn empty_filter_values_are_not_filters() {
        let q = ListQuery::from_url(&url("https://admin.test/users?keyword=&status="), 20, &[]);
        assert!(q.filters().is_empty());
        assert!(!q.is_filtered());
    }

    #[test]
    fn search_path_marks_filtered() {
        let q = ListQuery::from_url(&url("https://admin.test/orders/advanced_search?page=2"), 20, &[]);
        assert!(q.is_filtered());
        assert!(q.filters().is_empty());
    }

    #[test]
    fn endpoint_switches_to_search() {
        let base = url("https://admin.test/orders");
        let plain = ListQuery::default();
        assert_eq!(plain.endpoint(&base).unwrap().as_str(), "https://admin.test/orders");

        let filtered = ListQuery::default().with_filter("status", "done");
        assert_eq!(
            filtered.endpoint(&base).unwrap().as_str(),
            "https://admin.test/orders/advanced_search"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let base = url("https://admin.test/orders/");
        let filtered = ListQuery::default().with_filter("status", "done");
        assert_eq!(
            filtered.endpoint(&base).unwrap().as_str(),
            "https://admin.test/orders/advanced_search"
        );
    }

    #[test]
    fn set_filter_replaces_and_removes() {
        let mut q = ListQuery::default()
            .with_filter("status", "new")
            .with_filter("city", "paris");
        q.set_filter("status", "done");
        assert_eq!(q.filter("status"), Some("done"));
        q.set_filter("city", "");
        assert_eq!(q.filter("city"), None);
        assert!(q.is_filtered());
    }

    #[test]
    fn clear_filters_resets_flag() {
        let mut q = ListQuery::default().with_filter("status", "done");
        q.clear_filters();
        assert!(q.filters().is_empty());
        assert!(!q.is_filtered());
    }

    #[test]
    fn to_location_keeps_path() {
        let q = ListQuery::default().with_page(3).with_filter("status", "done");
        let loc = q.to_location(&url("https://admin.test/orders?page=1&junk=1"));
        assert_eq!(loc.path(), "/orders");
        assert_eq!(loc.query(), Some("page=3&per_page=20&status=done"));
    }
}
