use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/chat";

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("request to answer service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("answer service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed answer body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("answer service returned an empty response")]
    EmptyResponse,

    #[error("invalid answer service endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("answer task did not complete: {0}")]
    TaskFailed(String),
}

/// Something that turns a user query into an answer.
///
/// The HTTP client below is the production implementation; the exchange
/// controller only depends on this trait.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn answer(&self, query: &str) -> Result<String, AnswerError>;
}

#[derive(Serialize)]
struct AnswerRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct AnswerResponse {
    response: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Clone)]
pub struct AnswerClient {
    client: Client,
    endpoint: String,
}

impl AnswerClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn query(&self, query: &str) -> Result<String, AnswerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnswerRequest { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnswerError::Status { status, body });
        }

        // Read the body first so a bad payload is reported as malformed
        // rather than as a transport error.
        let body = response.text().await?;
        let answer: AnswerResponse = serde_json::from_str(&body)?;
        if answer.response.trim().is_empty() {
            return Err(AnswerError::EmptyResponse);
        }
        Ok(answer.response)
    }

    /// Probe `GET /health` on the endpoint's origin and return the reported status.
    pub async fn health(&self) -> Result<String, AnswerError> {
        let url = Url::parse(&self.endpoint)
            .and_then(|base| base.join("/health"))
            .map_err(|_| AnswerError::InvalidEndpoint(self.endpoint.clone()))?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnswerError::Status { status, body });
        }

        let body = response.text().await?;
        let health: HealthResponse = serde_json::from_str(&body)?;
        Ok(health.status)
    }
}

#[async_trait]
impl AnswerService for AnswerClient {
    async fn answer(&self, query: &str) -> Result<String, AnswerError> {
        self.query(query).await
    }
}
