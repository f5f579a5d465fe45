use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::EmbeddingProvider;
use crate::error::{PhotoError, PhotoResult};

/// Configuration for the external embedding service
#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub dimension: usize,
}

impl HttpEmbeddingConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: 5,
            dimension: 512,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn from_env() -> PhotoResult<Self> {
        let base_url = std::env::var("EMBEDDING_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8082/".to_string());

        let timeout_secs = match std::env::var("EMBEDDING_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|e| {
                PhotoError::Config(format!("EMBEDDING_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            Err(_) => 5,
        };

        Ok(Self::new(base_url).with_timeout(timeout_secs))
    }

    fn embed_url(&self) -> String {
        format!("{}/v1/embed", self.base_url)
    }
}

/// Embedding provider backed by the `POST /v1/embed` HTTP service.
pub struct HttpEmbeddingProvider {
    client: Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: HttpEmbeddingConfig) -> PhotoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PhotoError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> PhotoResult<Self> {
        Self::new(HttpEmbeddingConfig::from_env()?)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    v: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    #[instrument(skip(self))]
    async fn embed(&self, query: &str) -> PhotoResult<Vec<f32>> {
        let response = self
            .client
            .post(self.config.embed_url())
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|e| {
                let err = PhotoError::from_embedding_transport(&e);
                tracing::error!("Failed to retrieve embedding for '{}': {}", query, e);
                err
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Embedding service returned {}: {}", status, error_text);
            return Err(PhotoError::EmbeddingFailed(format!(
                "embedding service error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to decode embedding response: {}", e);
            PhotoError::EmbeddingFailed(format!("malformed embedding response: {}", e))
        })?;

        if body.v.len() != self.config.dimension {
            return Err(PhotoError::EmbeddingFailed(format!(
                "expected {} dimensions, got {}",
                self.config.dimension,
                body.v.len()
            )));
        }

        Ok(body.v)
    }
}
