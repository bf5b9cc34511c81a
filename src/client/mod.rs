pub mod http;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

use models::{QueryRequest, QueryResponse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The call never produced an HTTP response (unreachable, aborted, timed out)
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Query failed: {status_text} ({status})")]
    Service { status: u16, status_text: String },

    /// The body was not a structurally valid query response
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Raised while building a client, before any request is made
#[derive(Debug, Error)]
pub enum ClientSetupError {
    #[error("Invalid query service endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can answer a question with a tabular result.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;
}

