//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping transport errors and
/// adding lookup, configuration, and validation failures.
#[derive(Debug)]
pub enum TableError {
    /// An error from the underlying HTTP client.
    Api(ajaxtable_api::Error),
    /// The container region is not present on the current page.
    ContainerNotFound(String),
    /// A requested page number is not a valid page.
    InvalidPage(String),
    /// The server answered a row action with `success: false`.
    ActionRejected(String),
    /// Configuration could not be parsed or failed validation.
    Config(String),
    /// A configuration file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::ContainerNotFound(selector) => write!(f, "Container not found: {}", selector),
            Self::InvalidPage(msg) => write!(f, "Invalid page: {}", msg),
            Self::ActionRejected(msg) => write!(f, "Action rejected: {}", msg),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ajaxtable_api::Error> for TableError {
    fn from(e: ajaxtable_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<std::io::Error> for TableError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for TableError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
