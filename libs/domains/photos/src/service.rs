use std::sync::Arc;

use tracing::instrument;

use crate::embedding::EmbeddingProvider;
use crate::error::{PhotoError, PhotoResult};
use crate::identity::PointIdentity;
use crate::models::{
    DEFAULT_PAGE_SIZE, PageRequest, PhotoDetails, PhotoItem, PhotoPathsResponse,
    PhotoResultsResponse,
};
use crate::repository::PhotoRepository;

/// Photo service providing the gateway operations
///
/// Text queries go through the embedding provider first, then to the repository.
/// Everything else is a single repository call.
pub struct PhotoService<R: PhotoRepository> {
    repository: R,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl<R: PhotoRepository> PhotoService<R> {
    pub fn new(repository: R, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository,
            embedding_provider,
        }
    }

    // ===== Queries =====

    /// Text-to-image search.
    #[instrument(skip(self, page), fields(limit = page.limit(), offset = page.offset()))]
    pub async fn search(&self, query: &str, page: PageRequest) -> PhotoResult<PhotoResultsResponse> {
        page.validate()?;
        let vector = self.embedding_provider.embed(query).await?;

        let items = self
            .repository
            .search(vector, page.limit(), page.offset(), page.filter)
            .await?;

        tracing::debug!("Search for '{}' returned {} items", query, items.len());
        Ok(PhotoResultsResponse { items })
    }

    /// Photos similar to the indexed photo `id`.
    #[instrument(skip(self, page), fields(limit = page.limit(), offset = page.offset()))]
    pub async fn recommend(&self, id: &str, page: PageRequest) -> PhotoResult<PhotoResultsResponse> {
        let seed: PointIdentity = id.parse()?;
        page.validate()?;

        let items = self
            .repository
            .recommend(seed, page.limit(), page.offset(), page.filter)
            .await?;

        Ok(PhotoResultsResponse { items })
    }

    #[instrument(skip(self))]
    pub async fn get_details(&self, id: &str) -> PhotoResult<PhotoDetails> {
        let id: PointIdentity = id.parse()?;
        let payload = self.repository.get_payload(id).await?;
        Ok(PhotoDetails::from_payload(id, &payload))
    }

    /// Page through indexed paths; a missing or zero `size` means 100.
    #[instrument(skip(self))]
    pub async fn list_paths(
        &self,
        size: Option<u32>,
        offset: Option<&str>,
    ) -> PhotoResult<PhotoPathsResponse> {
        let offset = offset
            .filter(|o| !o.is_empty())
            .map(str::parse::<PointIdentity>)
            .transpose()?;

        self.repository
            .list_paths(size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE), offset)
            .await
    }

    // ===== Index Maintenance =====

    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn upsert(&self, items: Vec<PhotoItem>) -> PhotoResult<()> {
        if let Some(item) = items.iter().find(|item| item.path.is_empty()) {
            return Err(PhotoError::Validation(format!(
                "Item with {} dimensions has an empty path",
                item.vector.len()
            )));
        }

        if items.is_empty() {
            return Ok(());
        }

        self.repository.upsert(items).await
    }

    #[instrument(skip(self, paths), fields(count = paths.len()))]
    pub async fn delete(&self, paths: Vec<String>) -> PhotoResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        self.repository.delete(paths).await
    }

    /// Release the store connection. Called once, after the servers have stopped.
    pub fn shutdown(self) {
        tracing::info!("Closing vector store connection");
        drop(self.repository);
    }
}
