use std::time::Duration;

use crate::error::{PhotoError, PhotoResult};

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub vector_size: u64,
    /// Deadline for each steady-state call (search, upsert, ...).
    pub request_timeout_secs: u64,
    /// Deadline for the collection check and creation at startup.
    pub bootstrap_timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_timeouts(mut self, request_secs: u64, bootstrap_secs: u64) -> Self {
        self.request_timeout_secs = request_secs;
        self.bootstrap_timeout_secs = bootstrap_secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_secs(self.bootstrap_timeout_secs)
    }

    pub fn from_env() -> PhotoResult<Self> {
        let defaults = Self::default();

        let url = std::env::var("QDRANT_URL").unwrap_or(defaults.url);
        let api_key = std::env::var("QDRANT_API_KEY").ok().filter(|k| !k.is_empty());
        let collection = std::env::var("QDRANT_COLLECTION").unwrap_or(defaults.collection);

        Ok(Self {
            url,
            api_key,
            collection,
            vector_size: parse_env("QDRANT_VECTOR_SIZE", defaults.vector_size)?,
            request_timeout_secs: parse_env(
                "QDRANT_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            bootstrap_timeout_secs: parse_env(
                "QDRANT_BOOTSTRAP_TIMEOUT_SECS",
                defaults.bootstrap_timeout_secs,
            )?,
        })
    }
}

fn parse_env(key: &str, default: u64) -> PhotoResult<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| PhotoError::Config(format!("{} '{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "photos".to_string(),
            vector_size: 512,
            request_timeout_secs: 5,
            bootstrap_timeout_secs: 30,
        }
    }
}
