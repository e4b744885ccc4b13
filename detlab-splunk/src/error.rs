use thiserror::Error;

/// Errors raised by the platform clients.
///
/// Ingestion and query failures are terminal for the rule they occur in;
/// only the acknowledgment poll inside [`crate::HecClient::send`] ever
/// retries, and its exhaustion is the dedicated `IngestionTimeout`.
#[derive(Debug, Error)]
pub enum SplunkError {
    #[error("invalid platform url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("authentication against the management API failed: {0}")]
    Auth(String),
    #[error("platform request failed: {0}")]
    Transport(String),
    #[error("platform returned unexpected status {status} during {context}")]
    UnexpectedStatus {
        context: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("failed to decode platform response: {0}")]
    Decode(String),
    #[error("ingestion failed: {0}")]
    Ingestion(String),
    #[error("ingestion acknowledgment not confirmed after {attempts} polls")]
    IngestionTimeout { attempts: u32 },
    #[error("query execution failed: {0}")]
    Query(String),
}
