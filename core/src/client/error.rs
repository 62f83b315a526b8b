//! Errors surfaced by the Context7 HTTP client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Context7Error {
    /// No API key was configured and `CONTEXT7_API_KEY` is unset.
    #[error("Context7 API key not found. Set CONTEXT7_API_KEY or run 'ctx7 onboard'.")]
    MissingApiKey,

    /// Library identifier is not of the form `/owner/repo[/version]`.
    #[error("Invalid library ID '{0}': expected '/owner/repo' or '/owner/repo/version'")]
    InvalidLibraryId(String),

    /// A request parameter was rejected before anything was sent.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// 401 / 403 from the API.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404 from the API, usually an unknown library or version.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429 from the API. `retry_after` is in seconds when the server sent it.
    #[error("Rate limited by Context7{}", .retry_after.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Any other non-success status.
    #[error("Context7 API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body did not match the expected response shape.
    #[error("Failed to decode Context7 response: {0}")]
    Decode(String),
}

impl Context7Error {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Context7Error>;
