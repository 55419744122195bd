//! The partial-refresh engine bound to one container.
//!
//! Every fetch takes a token from a per-table counter. Only the response
//! carrying the newest token touches the page; older ones are dropped when
//! they arrive, so the last request issued wins no matter which response
//! lands last. While a request is outstanding every pagination control of
//! the table is disabled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ajaxtable_api::types::Stats;
use ajaxtable_api::{replace_page_param, Client, ListQuery, Query};
use url::Url;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::host::{Control, Dom, History, Host};

/// Container attribute that declares the initial view a search result.
pub const SEARCH_VIEW_ATTR: &str = "data-search";

/// Caller hook that attaches row-level handlers (delete, mark-read, ...)
/// to freshly rendered rows. Called with the page and the container selector.
pub type RowBinder = Arc<dyn Fn(&dyn Dom, &str) + Send + Sync>;

/// Result of a page change, reload, or filter change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fragment for `page` replaced the container contents.
    Rendered { page: u32 },
    /// Input failed validation; no request was made.
    Rejected,
    /// A newer request was issued before this one finished; its response was dropped.
    Superseded,
    /// The request failed and the page navigated to `url` instead.
    FellBack { url: Url },
    /// The request failed and the stale contents were left in place.
    Failed,
}

/// Page events routed to a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableEvent {
    PageLinkClicked(u32),
    JumpSubmitted(String),
    /// Back/forward navigation changed the location.
    PopState,
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableState {
    Idle,
    Loading,
}

struct Request {
    query: ListQuery,
    control: Option<Control>,
    /// History entry to add on success.
    push: Option<Url>,
    /// Full-navigation target on failure.
    fallback: Option<Url>,
}

pub struct AjaxTable {
    config: TableConfig,
    client: Client,
    dom: Arc<dyn Dom>,
    history: Arc<dyn History>,
    row_binder: Option<RowBinder>,
    query: Mutex<ListQuery>,
    /// Set when the page declared the initial view a search view.
    declared_search: bool,
    issued: AtomicU64,
    settled: AtomicU64,
    /// Control showing the spinner for the newest outstanding request.
    busy: Mutex<Option<Control>>,
}

impl std::fmt::Debug for AjaxTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AjaxTable")
            .field("container", &self.config.container)
            .field("base_url", &self.config.base_url.as_str())
            .field("query", &self.query())
            .finish()
    }
}

impl AjaxTable {
    /// Binds a table to its container on the current page.
    ///
    /// The query state is derived from the current location. Fails with
    /// [`TableError::ContainerNotFound`] when the region is not on this page.
    pub fn initialize(
        config: TableConfig,
        host: &Host,
        row_binder: Option<RowBinder>,
    ) -> Result<Self, TableError> {
        config.validate()?;
        if !host.dom.has_element(&config.container) {
            tracing::warn!("Table container {} not found, skipping", config.container);
            return Err(TableError::ContainerNotFound(config.container));
        }

        let declared_search = host
            .dom
            .attribute(&config.container, SEARCH_VIEW_ATTR)
            .is_some_and(|v| v == "true");
        let mut query = ListQuery::from_url(
            &host.history.location(),
            config.per_page,
            &config.searchable,
        );
        if declared_search {
            query.mark_filtered();
        }
        tracing::debug!(
            "Initialized table {} at page {} (filtered: {})",
            config.name(),
            query.page(),
            query.is_filtered()
        );

        let table = Self {
            config,
            client: host.client.clone(),
            dom: Arc::clone(&host.dom),
            history: Arc::clone(&host.history),
            row_binder,
            query: Mutex::new(query),
            declared_search,
            issued: AtomicU64::new(0),
            settled: AtomicU64::new(0),
            busy: Mutex::new(None),
        };
        table.bind();
        Ok(table)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn container(&self) -> &str {
        &self.config.container
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Snapshot of the current query state.
    pub fn query(&self) -> ListQuery {
        self.query.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn state(&self) -> TableState {
        if self.issued.load(Ordering::SeqCst) == self.settled.load(Ordering::SeqCst) {
            TableState::Idle
        } else {
            TableState::Loading
        }
    }

    /// Routes a page event to the matching operation.
    pub async fn handle(&self, event: TableEvent) -> LoadOutcome {
        match event {
            TableEvent::PageLinkClicked(page) => {
                self.go_to_page_from(page, Control::PageLink(page)).await
            }
            TableEvent::JumpSubmitted(input) => self.jump_to(&input).await,
            TableEvent::PopState => self.replay_location().await,
            TableEvent::Refresh => self.reload(Duration::ZERO).await,
        }
    }

    /// Loads `page` of the current query in place.
    ///
    /// Pages outside `1..=max_page` are rejected without a request and the
    /// jump control is flagged. On failure the page falls back to a full
    /// navigation to the same page number.
    pub async fn go_to_page(&self, page: u32) -> LoadOutcome {
        self.go_to_page_from(page, Control::JumpInput).await
    }

    /// Parses the jump control's text and loads that page.
    pub async fn jump_to(&self, input: &str) -> LoadOutcome {
        match input.trim().parse::<u32>() {
            Ok(page) => self.go_to_page_from(page, Control::JumpInput).await,
            Err(_) => {
                tracing::debug!("Rejected non-numeric page {:?}", input);
                self.dom
                    .flag_invalid(Control::JumpInput, self.config.invalid_flag());
                LoadOutcome::Rejected
            }
        }
    }

    async fn go_to_page_from(&self, page: u32, control: Control) -> LoadOutcome {
        if let Err(e) = self.check_page(page) {
            tracing::debug!("{}", e);
            self.dom.flag_invalid(control, self.config.invalid_flag());
            return LoadOutcome::Rejected;
        }
        let target = replace_page_param(&self.history.location(), page);
        let request = Request {
            query: self.query().with_page(page),
            control: Some(control),
            push: Some(target.clone()),
            fallback: Some(target),
        };
        self.load(request).await
    }

    fn check_page(&self, page: u32) -> Result<(), TableError> {
        if page == 0 {
            return Err(TableError::InvalidPage("page numbers start at 1".into()));
        }
        if let Some(max) = self.dom.max_page(&self.config.container) {
            if page > max {
                return Err(TableError::InvalidPage(format!(
                    "{} is past the last page {}",
                    page, max
                )));
            }
        }
        Ok(())
    }

    /// Re-fetches the current page after `delay`. A failed reload leaves the
    /// current contents in place.
    pub async fn reload(&self, delay: Duration) -> LoadOutcome {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let request = Request {
            query: self.query(),
            control: None,
            push: None,
            fallback: None,
        };
        self.load(request).await
    }

    /// Replaces the filters, returns to page 1, and loads through the search
    /// endpoint. Keys outside the declared searchable fields are dropped.
    pub async fn apply_filters<I, K, V>(&self, filters: I) -> LoadOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = self.query().with_page(1);
        query.clear_filters();
        for (key, value) in filters {
            let key = key.into();
            if !self.config.searchable.is_empty() && !self.config.searchable.contains(&key) {
                tracing::warn!("Ignoring undeclared filter {} on {}", key, self.config.name());
                continue;
            }
            query.set_filter(key, value);
        }
        self.load_query(query).await
    }

    /// Clears every filter and returns to page 1 of the plain list.
    pub async fn reset_filters(&self) -> LoadOutcome {
        let mut query = self.query().with_page(1);
        query.clear_filters();
        self.load_query(query).await
    }

    async fn load_query(&self, query: ListQuery) -> LoadOutcome {
        let target = query.to_location(&self.history.location());
        let request = Request {
            query,
            control: None,
            push: Some(target.clone()),
            fallback: Some(target),
        };
        self.load(request).await
    }

    /// Re-derives the query from the location after back/forward navigation
    /// and renders it without adding a history entry.
    async fn replay_location(&self) -> LoadOutcome {
        let location = self.history.location();
        let mut query =
            ListQuery::from_url(&location, self.config.per_page, &self.config.searchable);
        if self.declared_search {
            query.mark_filtered();
        }
        let request = Request {
            query,
            control: None,
            push: None,
            fallback: Some(location),
        };
        self.load(request).await
    }

    async fn load(&self, request: Request) -> LoadOutcome {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let container = self.config.container.as_str();
        self.mark_busy(request.control);
        self.dom.set_controls_disabled(container, true);
        self.dom.show_loading(container);

        let result = self
            .client
            .fetch_list(&self.config.base_url, &request.query)
            .await;

        if self.issued.load(Ordering::SeqCst) != token {
            tracing::warn!(
                "Dropping stale response for page {} of {}",
                request.query.page(),
                self.config.name()
            );
            return LoadOutcome::Superseded;
        }
        self.settled.store(token, Ordering::SeqCst);
        self.mark_busy(None);
        self.dom.hide_loading(container);
        self.dom.set_controls_disabled(container, false);

        match result {
            Ok(resp) => {
                let page = request.query.page();
                self.dom.set_inner_html(container, &resp.html);
                *self.query.lock().unwrap_or_else(|e| e.into_inner()) = request.query;
                if let Some(url) = &request.push {
                    self.history.push_state(page, url);
                }
                if let Some(stats) = &resp.stats {
                    self.update_stats(stats);
                }
                self.bind();
                LoadOutcome::Rendered { page }
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", self.config.name(), e);
                match request.fallback {
                    Some(url) => {
                        tracing::info!("Falling back to full navigation: {}", url);
                        self.history.navigate(&url);
                        LoadOutcome::FellBack { url }
                    }
                    None => LoadOutcome::Failed,
                }
            }
        }
    }

    /// Moves the spinner to `control`, clearing whichever control held it.
    /// Only the newest request settles it; superseded responses leave it alone.
    fn mark_busy(&self, control: Option<Control>) {
        let mut busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = busy.take() {
            if Some(previous) != control {
                self.dom.set_busy(previous, false);
            }
        }
        if let Some(control) = control {
            self.dom.set_busy(control, true);
        }
        *busy = control;
    }

    /// Writes each configured stats field present in `stats` to its element.
    /// Fields without a value and elements missing from the page are skipped.
    pub fn update_stats(&self, stats: &Stats) {
        for (field, element_id) in self.config.stats.iter() {
            let Some(value) = stats.get(field) else {
                continue;
            };
            if !self.dom.set_text(element_id, &value.to_string()) {
                tracing::debug!("Stats element #{} not on page", element_id);
            }
        }
    }

    /// The fragment just rendered has fresh nodes with no handlers.
    fn bind(&self) {
        self.dom.bind_pagination(&self.config.container);
        if let Some(binder) = &self.row_binder {
            binder(self.dom.as_ref(), &self.config.container);
        }
    }
}
