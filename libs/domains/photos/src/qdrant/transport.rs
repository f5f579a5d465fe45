use async_trait::async_trait;
use qdrant_client::qdrant::{
    CollectionOperationResponse, CreateCollection, DeletePoints, GetCollectionInfoResponse,
    GetPoints, GetResponse, PointsOperationResponse, RecommendPoints, RecommendResponse,
    ScrollPoints, ScrollResponse, SearchPoints, SearchResponse, UpsertPoints,
};
use qdrant_client::{Qdrant, QdrantError};
use tonic::{Code, Status};

/// The raw Qdrant RPCs the photo store needs.
///
/// Failures are reported as gRPC statuses so callers can classify them by code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QdrantTransport: Send + Sync {
    async fn collection_info(&self, collection: &str) -> Result<GetCollectionInfoResponse, Status>;

    async fn create_collection(
        &self,
        request: CreateCollection,
    ) -> Result<CollectionOperationResponse, Status>;

    async fn upsert_points(&self, request: UpsertPoints)
    -> Result<PointsOperationResponse, Status>;

    async fn delete_points(&self, request: DeletePoints)
    -> Result<PointsOperationResponse, Status>;

    async fn search_points(&self, request: SearchPoints) -> Result<SearchResponse, Status>;

    async fn recommend_points(&self, request: RecommendPoints)
    -> Result<RecommendResponse, Status>;

    async fn get_points(&self, request: GetPoints) -> Result<GetResponse, Status>;

    async fn scroll_points(&self, request: ScrollPoints) -> Result<ScrollResponse, Status>;
}

/// qdrant-client may link a different tonic than this crate, so statuses are rebuilt
/// from their wire code.
fn to_status(err: QdrantError) -> Status {
    match err {
        QdrantError::ResponseError { status } => Status::new(
            Code::from_i32(status.code() as i32),
            status.message().to_string(),
        ),
        other => Status::unknown(other.to_string()),
    }
}

#[async_trait]
impl QdrantTransport for Qdrant {
    async fn collection_info(&self, collection: &str) -> Result<GetCollectionInfoResponse, Status> {
        Qdrant::collection_info(self, collection)
            .await
            .map_err(to_status)
    }

    async fn create_collection(
        &self,
        request: CreateCollection,
    ) -> Result<CollectionOperationResponse, Status> {
        Qdrant::create_collection(self, request)
            .await
            .map_err(to_status)
    }

    async fn upsert_points(
        &self,
        request: UpsertPoints,
    ) -> Result<PointsOperationResponse, Status> {
        Qdrant::upsert_points(self, request).await.map_err(to_status)
    }

    async fn delete_points(
        &self,
        request: DeletePoints,
    ) -> Result<PointsOperationResponse, Status> {
        Qdrant::delete_points(self, request).await.map_err(to_status)
    }

    async fn search_points(&self, request: SearchPoints) -> Result<SearchResponse, Status> {
        Qdrant::search_points(self, request).await.map_err(to_status)
    }

    async fn recommend_points(
        &self,
        request: RecommendPoints,
    ) -> Result<RecommendResponse, Status> {
        Qdrant::recommend(self, request).await.map_err(to_status)
    }

    async fn get_points(&self, request: GetPoints) -> Result<GetResponse, Status> {
        Qdrant::get_points(self, request).await.map_err(to_status)
    }

    async fn scroll_points(&self, request: ScrollPoints) -> Result<ScrollResponse, Status> {
        Qdrant::scroll(self, request).await.map_err(to_status)
    }
}
