use thiserror::Error;

/// Error taxonomy for the lookup core.
///
/// Only input and transport failures surface here. Extraction never
/// fails with an error: a parse miss degrades to a raw-data fallback and
/// a confirmed "not registered" response is a successful lookup with
/// not-found semantics (see [`ExtractionOutcome`](crate::ExtractionOutcome)).
#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unsupported TLD: {0}")]
    UnsupportedTld(String),

    #[error("DNS resolution failed for {server}: {detail}")]
    DnsError { server: String, detail: String },

    #[error("Connection to {server} failed: {detail}")]
    ConnectFailed { server: String, detail: String },

    #[error("Network timeout")]
    Timeout,

    #[error("Server closed the connection without sending any data")]
    EmptyResponse,

    #[error("Response too large")]
    ResponseTooLarge,

    #[error("IO error: {0}")]
    IoError(#[from] tokio::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl From<tokio::time::error::Elapsed> for WhoisError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        WhoisError::Timeout
    }
}
