use async_trait::async_trait;

use crate::error::PhotoResult;
use crate::filter::PhotoFilter;
use crate::identity::PointIdentity;
use crate::models::{PhotoItem, PhotoPathsResponse, PhotoResultItem};
use crate::payload::StoredPayload;

/// Repository trait for photo points in the vector store
///
/// Every method is a single downstream call bounded by a deadline; failures come back
/// already classified into recoverable and non-recoverable errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Write all items in one batch, overwriting points with the same path.
    async fn upsert(&self, items: Vec<PhotoItem>) -> PhotoResult<()>;

    /// Delete the points for these paths. Unknown paths are ignored.
    async fn delete(&self, paths: Vec<String>) -> PhotoResult<()>;

    /// Nearest neighbours of `vector`, most similar first.
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u32,
        offset: u32,
        filter: Option<PhotoFilter>,
    ) -> PhotoResult<Vec<PhotoResultItem>>;

    /// Photos similar to an already indexed one.
    async fn recommend(
        &self,
        seed: PointIdentity,
        limit: u32,
        offset: u32,
        filter: Option<PhotoFilter>,
    ) -> PhotoResult<Vec<PhotoResultItem>>;

    /// Stored payload of one point; `NotFound` if it does not exist.
    async fn get_payload(&self, id: PointIdentity) -> PhotoResult<StoredPayload>;

    /// One page of indexed paths, starting at `offset` when given.
    async fn list_paths(
        &self,
        limit: u32,
        offset: Option<PointIdentity>,
    ) -> PhotoResult<PhotoPathsResponse>;
}
