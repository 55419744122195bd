//! HTTP client for server-rendered list endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{ListQuery, Query, AJAX_PARAM, INCLUDE_STATS_PARAM},
    types::{ActionResponse, BatchRequest, ListResponse},
    Error,
};

/// Knobs for the underlying HTTP client.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("ajaxtable/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for list fragments and row actions.
///
/// Requests carry `X-Requested-With: XMLHttpRequest` so servers that share a
/// route between full pages and partial payloads can tell them apart. Each
/// request builds a fresh `reqwest::Client` from the stored options.
#[derive(Clone, Debug, Default)]
pub struct Client {
    options: ClientOptions,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ClientOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Builds the partial-refresh request URL for `query` under `base`:
    /// the list or search endpoint, pagination, filters, then the
    /// `ajax=1&include_stats=1` transport flags.
    pub fn list_url(&self, base: &Url, query: &ListQuery) -> Result<Url, Error> {
        let endpoint = query.endpoint(base)?;
        let mut url = query.add_to_url(&endpoint);
        url.query_pairs_mut()
            .append_pair(AJAX_PARAM, "1")
            .append_pair(INCLUDE_STATS_PARAM, "1");
        Ok(url)
    }

    fn http(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(self.options.user_agent.as_str())
            .timeout(self.options.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = request
            .header("accept", "application/json, text/plain, */*")
            .header("x-requested-with", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::InvalidResponse(e.to_string())
        })
    }

    /// Fetches one page of a list as a partial-refresh payload.
    pub async fn fetch_list(&self, base: &Url, query: &ListQuery) -> Result<ListResponse, Error> {
        let url = self.list_url(base, query)?;
        tracing::debug!("GET {}", url);
        let request = self.http()?.get(url);
        self.send::<ListResponse>(request).await
    }

    /// Posts a single-row mutation to `url`.
    pub async fn post_action(&self, url: Url) -> Result<ActionResponse, Error> {
        tracing::debug!("POST {}", url);
        let request = self.http()?.post(url);
        self.send::<ActionResponse>(request).await
    }

    /// Posts a batch mutation over `ids` to `url`.
    pub async fn post_batch(&self, url: Url, ids: &[String]) -> Result<ActionResponse, Error> {
        tracing::debug!("POST {} ({} ids)", url, ids.len());
        let body = BatchRequest { ids: ids.to_vec() };
        let request = self.http()?.post(url).json(&body);
        self.send::<ActionResponse>(request).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_body_untouched() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() <= 2000 + "...[truncated]".len());
    }
}
