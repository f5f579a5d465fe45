use async_trait::async_trait;

use crate::error::PhotoResult;

/// Turns free-text queries into vectors in the same space as the indexed photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single query.
    async fn embed(&self, query: &str) -> PhotoResult<Vec<f32>>;
}
