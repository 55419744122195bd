//! In-memory page used by the headless CLI and by tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use regex::Regex;
use url::Url;

use super::{Control, Dom, History};

fn max_page_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#"data-max-page="(\d+)""#)
                .map_err(|e| tracing::error!("regex compile error: {}", e))
                .ok()
        })
        .as_ref()
}

#[derive(Default)]
struct DomState {
    html: HashMap<String, String>,
    text: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    busy: HashSet<Control>,
    disabled: HashSet<String>,
    invalid: HashMap<Control, Instant>,
    loading: HashSet<String>,
    pagination_binds: HashMap<String, usize>,
}

/// A flat map of selectors to markup plus element ids to text.
///
/// Container selectors and element ids live in separate namespaces; a
/// selector "exists" once it has markup, an id once it has text.
#[derive(Default)]
pub struct MemoryDom {
    state: Mutex<DomState>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, selector: &str, html: &str) -> Self {
        self.lock().html.insert(selector.to_string(), html.to_string());
        self
    }

    pub fn with_element(self, id: &str, text: &str) -> Self {
        self.lock().text.insert(id.to_string(), text.to_string());
        self
    }

    pub fn with_attribute(self, selector: &str, name: &str, value: &str) -> Self {
        self.lock()
            .attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DomState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.lock().text.get(id).cloned()
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.lock().busy.contains(&control)
    }

    pub fn controls_disabled(&self, container: &str) -> bool {
        self.lock().disabled.contains(container)
    }

    /// True while the invalid highlight on `control` has not expired.
    pub fn is_flagged_invalid(&self, control: Control) -> bool {
        self.lock()
            .invalid
            .get(&control)
            .map(|until| Instant::now() < *until)
            .unwrap_or(false)
    }

    pub fn is_loading(&self, container: &str) -> bool {
        self.lock().loading.contains(container)
    }

    pub fn pagination_bind_count(&self, container: &str) -> usize {
        self.lock()
            .pagination_binds
            .get(container)
            .copied()
            .unwrap_or(0)
    }
}

impl Dom for MemoryDom {
    fn has_element(&self, selector: &str) -> bool {
        let state = self.lock();
        state.html.contains_key(selector) || state.text.contains_key(selector)
    }

    fn inner_html(&self, selector: &str) -> Option<String> {
        self.lock().html.get(selector).cloned()
    }

    fn set_inner_html(&self, selector: &str, html: &str) -> bool {
        match self.lock().html.get_mut(selector) {
            Some(current) => {
                *current = html.to_string();
                true
            }
            None => false,
        }
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        match self.lock().text.get_mut(id) {
            Some(current) => {
                *current = text.to_string();
                true
            }
            None => false,
        }
    }

    fn attribute(&self, selector: &str, name: &str) -> Option<String> {
        self.lock()
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned()
    }

    fn max_page(&self, container: &str) -> Option<u32> {
        let re = max_page_pattern()?;
        let from_markup = self.inner_html(container).and_then(|html| {
            re.captures(&html)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        });
        from_markup.or_else(|| {
            self.attribute(container, "data-max-page")
                .and_then(|v| v.parse::<u32>().ok())
        })
    }

    fn set_busy(&self, control: Control, busy: bool) {
        let mut state = self.lock();
        if busy {
            state.busy.insert(control);
        } else {
            state.busy.remove(&control);
        }
    }

    fn set_controls_disabled(&self, container: &str, disabled: bool) {
        let mut state = self.lock();
        if disabled {
            state.disabled.insert(container.to_string());
        } else {
            state.disabled.remove(container);
        }
    }

    fn flag_invalid(&self, control: Control, duration: Duration) {
        self.lock().invalid.insert(control, Instant::now() + duration);
    }

    fn show_loading(&self, container: &str) {
        self.lock().loading.insert(container.to_string());
    }

    fn hide_loading(&self, container: &str) {
        self.lock().loading.remove(container);
    }

    fn bind_pagination(&self, container: &str) {
        *self
            .lock()
            .pagination_binds
            .entry(container.to_string())
            .or_insert(0) += 1;
    }
}

struct HistoryState {
    entries: Vec<Url>,
    index: usize,
    navigated: Option<Url>,
}

/// Session history with a cursor, plus a record of the last full navigation.
pub struct MemoryHistory {
    state: Mutex<HistoryState>,
}

impl MemoryHistory {
    pub fn new(location: Url) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![location],
                index: 0,
                navigated: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves one entry back and returns the new location, as a browser does
    /// right before firing `popstate`.
    pub fn back(&self) -> Option<Url> {
        let mut state = self.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        Some(state.entries[state.index].clone())
    }

    pub fn forward(&self) -> Option<Url> {
        let mut state = self.lock();
        if state.index + 1 >= state.entries.len() {
            return None;
        }
        state.index += 1;
        Some(state.entries[state.index].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Target of the last full navigation, if any happened.
    pub fn navigated(&self) -> Option<Url> {
        self.lock().navigated.clone()
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Url {
        let state = self.lock();
        state.entries[state.index].clone()
    }

    fn push_state(&self, page: u32, url: &Url) {
        let mut state = self.lock();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(url.clone());
        state.index = state.entries.len() - 1;
        tracing::debug!("pushState page={} {}", page, url);
    }

    fn navigate(&self, url: &Url) {
        let mut state = self.lock();
        let keep = state.index + 1;
        state.entries.truncate(keep);
        state.entries.push(url.clone());
        state.index = state.entries.len() - 1;
        state.navigated = Some(url.clone());
    }
}
