//! Error types for the list transport.

/// Errors that can occur when fetching a list fragment or posting a row action.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The server returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A request URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The body was not a valid response envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
