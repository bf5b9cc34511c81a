use crate::client::models::{QueryRequest, QueryResponse};
use crate::client::{ClientError, ClientSetupError, QueryService};
use crate::config::ServiceConfig;
use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Talks to the remote query/analysis service over HTTP + JSON.
pub struct HttpQueryClient {
    client: reqwest::Client,
    endpoint: Url,
    strict_row_count: bool,
}

impl HttpQueryClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientSetupError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| ClientSetupError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientSetupError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: format!("unsupported scheme {}", endpoint.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            strict_row_count: config.strict_row_count,
        })
    }
}

#[async_trait]
impl QueryService for HttpQueryClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let start = Instant::now();
        debug!("POST {} question={:?}", self.endpoint, request.question);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Query service unreachable at {}: {}", self.endpoint, e);
                ClientError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            warn!("Query service responded with status {}", status);
            return Err(ClientError::Service {
                status: status.as_u16(),
                status_text,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let parsed: QueryResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::Malformed(e.to_string()))?;

        if parsed.row_count != parsed.rows.len() as u64 {
            if self.strict_row_count {
                return Err(ClientError::Malformed(format!(
                    "row_count is {} but {} rows were returned",
                    parsed.row_count,
                    parsed.rows.len()
                )));
            }
            warn!(
                "row_count {} does not match {} returned rows",
                parsed.row_count,
                parsed.rows.len()
            );
        }

        info!(
            "Query answered: {} rows in {}ms (service {}ms, cached: {})",
            parsed.rows.len(),
            start.elapsed().as_millis(),
            parsed.execution_time_ms,
            parsed.cached
        );

        Ok(parsed)
    }
}
