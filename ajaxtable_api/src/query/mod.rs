mod common;
pub use self::common::{
    replace_page_param, Query, QueryCommon, AJAX_PARAM, DEFAULT_PER_PAGE, INCLUDE_STATS_PARAM,
    PAGE_PARAM, PER_PAGE_PARAM,
};

mod list;
pub use self::list::{ListQuery, SEARCH_SEGMENT};
