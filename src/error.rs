use thiserror::Error;
pub use url::ParseError as UrlParseError;

/// Error types for the UniFi station management client.
#[derive(Error, Debug)]
pub enum UniFiError {
    /// Authentication failed with the UniFi controller.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The controller reported an error in the response metadata.
    ///
    /// The message is surfaced verbatim. A metadata error takes priority
    /// over any cardinality check: when present, the response's data
    /// sequence is not trustworthy even if it is non-empty.
    #[error("API error: {0}")]
    ApiError(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error parsing URL.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] UrlParseError),

    /// No matching record where exactly one was expected.
    ///
    /// Covers both "no such MAC/id" lookups and station commands that the
    /// controller did not report as affecting a record; the two cases are
    /// indistinguishable on the wire.
    #[error("Not found")]
    NotFound,

    /// The controller violated the expected envelope contract, e.g. the
    /// nested per-object wrapper on a group write is missing. Distinct from
    /// [`UniFiError::NotFound`]: this signals a contract break rather than
    /// a normal absence.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Error serializing or deserializing JSON.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Client is not authenticated.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
}

/// Result type for UniFi station management operations.
pub type UniFiResult<T> = Result<T, UniFiError>;
