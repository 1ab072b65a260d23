//! MBTA client error types.

/// Errors from fetching MBTA resources.
///
/// Every variant aborts the refresh tick that produced it; the previous
/// snapshot stays in place.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, timeout, or other transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned a non-2xx status.
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Rate limited by the API (HTTP 429).
    #[error("rate limited by MBTA API")]
    RateLimited,

    /// API key rejected (HTTP 401/403).
    #[error("unauthorized: check MBTA_API_KEY")]
    Unauthorized,

    /// Response body was not the expected JSON document.
    #[error("JSON parse error: {message}")]
    Decode { message: String },

    /// API key cannot be sent as a header value.
    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
}
