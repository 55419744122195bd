//! The page a table lives on, reached only through these traits.

use std::sync::Arc;
use std::time::Duration;

use ajaxtable_api::Client;
use url::Url;

mod memory;
pub use self::memory::{MemoryDom, MemoryHistory};

/// A UI control that can trigger a page change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// A numbered link in the pagination bar.
    PageLink(u32),
    /// The numeric "jump to page" input.
    JumpInput,
}

/// Document access needed by a table. Methods that target a missing
/// element are no-ops.
pub trait Dom: Send + Sync {
    fn has_element(&self, selector: &str) -> bool;

    fn inner_html(&self, selector: &str) -> Option<String>;

    /// Replaces the children of `selector`. Returns false if it does not exist.
    fn set_inner_html(&self, selector: &str, html: &str) -> bool;

    /// Sets the text of the element with `id`. Returns false if it does not exist.
    fn set_text(&self, id: &str, text: &str) -> bool;

    fn attribute(&self, selector: &str, name: &str) -> Option<String>;

    /// Highest page the rendered pagination bar inside `container` allows.
    fn max_page(&self, container: &str) -> Option<u32>;

    /// Shows or clears the spinner on a control and toggles its disabled state.
    fn set_busy(&self, control: Control, busy: bool);

    /// Enables or disables every pagination control inside `container`.
    fn set_controls_disabled(&self, container: &str, disabled: bool);

    /// Highlights `control` as invalid; the highlight clears after `duration`.
    fn flag_invalid(&self, control: Control, duration: Duration);

    fn show_loading(&self, container: &str);

    fn hide_loading(&self, container: &str);

    /// Attaches click handlers to the pagination links currently inside `container`.
    fn bind_pagination(&self, container: &str);
}

/// Address bar and session history.
pub trait History: Send + Sync {
    fn location(&self) -> Url;

    /// Adds a history entry without navigating.
    fn push_state(&self, page: u32, url: &Url);

    /// Full navigation to `url`.
    fn navigate(&self, url: &Url);
}

/// Collaborators shared by every table on one page.
#[derive(Clone)]
pub struct Host {
    pub client: Client,
    pub dom: Arc<dyn Dom>,
    pub history: Arc<dyn History>,
}

impl Host {
    pub fn new(client: Client, dom: Arc<dyn Dom>, history: Arc<dyn History>) -> Self {
        Self {
            client,
            dom,
            history,
        }
    }
}
