//! HTTP transport for server-rendered list views: query state, URL
//! serialization, and the `{html, stats}` partial-refresh envelope.

mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{Client, ClientOptions};
pub use self::errors::Error;
pub use self::query::{
    replace_page_param, ListQuery, Query, QueryCommon, AJAX_PARAM, DEFAULT_PER_PAGE,
    INCLUDE_STATS_PARAM, PAGE_PARAM, PER_PAGE_PARAM, SEARCH_SEGMENT,
};
