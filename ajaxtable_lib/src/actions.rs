//! Row-level mutations that refresh their table in place afterwards.

use std::sync::Arc;

use ajaxtable_api::types::ActionResponse;
use url::Url;

use crate::error::TableError;
use crate::table::{AjaxTable, LoadOutcome};

/// Posts delete / mark-read style actions for rows of one table and reloads
/// the table once the server accepts them.
///
/// Single-row actions go to `{base_url}/{id}/{action}`, batch actions to
/// `{base_url}/batch/{action}` with a JSON `{"ids": [...]}` body.
#[derive(Clone)]
pub struct RowActions {
    table: Arc<AjaxTable>,
}

impl RowActions {
    pub fn new(table: Arc<AjaxTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<AjaxTable> {
        &self.table
    }

    fn action_url(&self, segments: &[&str]) -> Result<Url, TableError> {
        let base = &self.table.config().base_url;
        let mut url = base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| TableError::Config(format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Runs `action` on the row `id`.
    pub async fn run(&self, action: &str, id: &str) -> Result<ActionResponse, TableError> {
        let url = self.action_url(&[id, action])?;
        let resp = self.table.client().post_action(url).await?;
        self.settle(action, resp).await
    }

    /// Runs `action` on every row in `ids`. An empty selection is rejected
    /// without a request.
    pub async fn run_batch(
        &self,
        action: &str,
        ids: &[String],
    ) -> Result<ActionResponse, TableError> {
        if ids.is_empty() {
            return Err(TableError::ActionRejected(format!(
                "no rows selected for {}",
                action
            )));
        }
        let url = self.action_url(&["batch", action])?;
        let resp = self.table.client().post_batch(url, ids).await?;
        self.settle(action, resp).await
    }

    async fn settle(
        &self,
        action: &str,
        resp: ActionResponse,
    ) -> Result<ActionResponse, TableError> {
        if !resp.success {
            let message = resp
                .message
                .clone()
                .unwrap_or_else(|| format!("{} failed", action));
            tracing::warn!("Server rejected {}: {}", action, message);
            return Err(TableError::ActionRejected(message));
        }
        let delay = self.table.config().reload_delay();
        if let LoadOutcome::Failed = self.table.reload(delay).await {
            tracing::warn!("Reload after {} failed; list may be stale", action);
        }
        Ok(resp)
    }
}
