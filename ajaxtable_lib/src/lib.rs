//! Partial-refresh engine for server-rendered list views.
//!
//! An [`AjaxTable`] keeps one region of a page in sync with a list query,
//! fetching `{html, stats}` fragments through `ajaxtable_api` instead of
//! navigating, while keeping the address bar and history consistent. The
//! page itself is reached only through the [`Dom`] and [`History`] traits.

pub mod actions;
pub mod config;
pub mod error;
pub mod host;
pub mod registry;
pub mod table;

pub use ajaxtable_api;
pub use ajaxtable_api::types;
pub use ajaxtable_api::{Client, ClientOptions, ListQuery, Query};

pub use actions::RowActions;
pub use config::{AppConfig, HttpConfig, TableConfig};
pub use error::TableError;
pub use host::{Control, Dom, History, Host, MemoryDom, MemoryHistory};
pub use registry::TableRegistry;
pub use table::{AjaxTable, LoadOutcome, RowBinder, TableEvent, TableState};
