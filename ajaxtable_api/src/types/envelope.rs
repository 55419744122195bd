use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate counters keyed by logical name (`total`, `unread`, ...).
pub type Stats = BTreeMap<String, serde_json::Number>;

/// Partial-refresh payload returned for `ajax=1` list requests.
///
/// `html` is pre-rendered markup that replaces the table body and its
/// pagination controls verbatim. A missing `stats` object leaves the
/// previously displayed counters as they are.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListResponse {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

/// Reply to a row-level mutation (delete, mark-read, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a batch mutation request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub ids: Vec<String>,
}
