use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance, GetPointsBuilder, PointId,
    PointStruct, RecommendPointsBuilder, ScoredPoint, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use tonic::{Code, Status};
use tracing::instrument;

use super::{QdrantConfig, QdrantTransport};
use crate::error::{PhotoError, PhotoResult};
use crate::filter::{self, PhotoFilter};
use crate::identity::PointIdentity;
use crate::models::{PhotoItem, PhotoPathsResponse, PhotoResultItem};
use crate::payload::{StoredPayload, encode_payload};
use crate::repository::PhotoRepository;

/// Qdrant-backed implementation of PhotoRepository
///
/// Owns the single long-lived connection shared by all requests. The underlying
/// channel is safe for concurrent use, so no locking happens here.
pub struct QdrantPhotoRepository<T = Qdrant> {
    transport: T,
    collection: String,
    vector_size: u64,
    request_timeout: Duration,
    bootstrap_timeout: Duration,
}

impl QdrantPhotoRepository<Qdrant> {
    /// Connect and make sure the collection exists, creating it if needed.
    pub async fn connect(config: QdrantConfig) -> PhotoResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        builder = builder.timeout(config.bootstrap_timeout());

        let client = builder
            .build()
            .map_err(|e| PhotoError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        Self::with_transport(client, &config).await
    }
}

impl<T: QdrantTransport> QdrantPhotoRepository<T> {
    pub async fn with_transport(transport: T, config: &QdrantConfig) -> PhotoResult<Self> {
        let repository = Self {
            transport,
            collection: config.collection.clone(),
            vector_size: config.vector_size,
            request_timeout: config.request_timeout(),
            bootstrap_timeout: config.bootstrap_timeout(),
        };

        repository.ensure_collection().await?;

        Ok(repository)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn ensure_collection(&self) -> PhotoResult<()> {
        let lookup = with_deadline(
            self.bootstrap_timeout,
            self.transport.collection_info(&self.collection),
        )
        .await;

        match lookup {
            Ok(_) => Ok(()),
            Err(status) if status.code() == Code::NotFound => self.create_collection().await,
            Err(status) => Err(classify("get collection details", status)),
        }
    }

    async fn create_collection(&self) -> PhotoResult<()> {
        tracing::info!(
            "Collection '{}' does not exist, creating it ...",
            self.collection
        );

        let request = CreateCollectionBuilder::new(&self.collection)
            .vectors_config(VectorParamsBuilder::new(self.vector_size, Distance::Cosine))
            .build();

        with_deadline(
            self.bootstrap_timeout,
            self.transport.create_collection(request),
        )
        .await
        .map_err(|status| classify("create collection", status))?;

        tracing::info!("Collection '{}' successfully created.", self.collection);
        Ok(())
    }

    fn to_point(&self, item: PhotoItem) -> PhotoResult<PointStruct> {
        if item.vector.len() as u64 != self.vector_size {
            return Err(PhotoError::Validation(format!(
                "Vector for '{}' has {} dimensions, expected {}",
                item.path,
                item.vector.len(),
                self.vector_size
            )));
        }

        let payload = encode_payload(&item.path, item.timestamp, &item.exif);
        Ok(PointStruct::new(
            PointId::from(item.id()),
            item.vector,
            payload,
        ))
    }
}

#[async_trait]
impl<T: QdrantTransport> PhotoRepository for QdrantPhotoRepository<T> {
    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn upsert(&self, items: Vec<PhotoItem>) -> PhotoResult<()> {
        let points = items
            .into_iter()
            .map(|item| self.to_point(item))
            .collect::<PhotoResult<Vec<_>>>()?;

        let request = UpsertPointsBuilder::new(&self.collection, points)
            .wait(true)
            .build();

        with_deadline(self.request_timeout, self.transport.upsert_points(request))
            .await
            .map_err(|status| classify("upsert points", status))?;

        Ok(())
    }

    #[instrument(skip(self, paths), fields(count = paths.len()))]
    async fn delete(&self, paths: Vec<String>) -> PhotoResult<()> {
        let point_ids: Vec<PointId> = paths
            .iter()
            .map(|path| PointId::from(PointIdentity::derive(path)))
            .collect();

        let request = DeletePointsBuilder::new(&self.collection)
            .points(point_ids)
            .wait(true)
            .build();

        with_deadline(self.request_timeout, self.transport.delete_points(request))
            .await
            .map_err(|status| classify("delete points", status))?;

        Ok(())
    }

    #[instrument(skip(self, vector))]
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: u32,
        offset: u32,
        filter: Option<PhotoFilter>,
    ) -> PhotoResult<Vec<PhotoResultItem>> {
        let mut builder = SearchPointsBuilder::new(&self.collection, vector, u64::from(limit))
            .offset(u64::from(offset))
            .with_payload(true);

        if let Some(compiled) = filter::compile(filter.as_ref()) {
            tracing::debug!("Search filter: {:?}", compiled);
            builder = builder.filter(compiled);
        }

        let response = with_deadline(
            self.request_timeout,
            self.transport.search_points(builder.build()),
        )
        .await
        .map_err(|status| classify("search vectors", status))?;

        response.result.into_iter().map(to_result_item).collect()
    }

    #[instrument(skip(self), fields(seed = %seed))]
    async fn recommend(
        &self,
        seed: PointIdentity,
        limit: u32,
        offset: u32,
        filter: Option<PhotoFilter>,
    ) -> PhotoResult<Vec<PhotoResultItem>> {
        let mut builder = RecommendPointsBuilder::new(&self.collection, u64::from(limit))
            .add_positive(PointId::from(seed))
            .offset(u64::from(offset))
            .with_payload(true);

        if let Some(compiled) = filter::compile(filter.as_ref()) {
            tracing::debug!("Recommend filter: {:?}", compiled);
            builder = builder.filter(compiled);
        }

        let response = with_deadline(
            self.request_timeout,
            self.transport.recommend_points(builder.build()),
        )
        .await
        .map_err(|status| classify("recommend similar", status))?;

        response.result.into_iter().map(to_result_item).collect()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_payload(&self, id: PointIdentity) -> PhotoResult<StoredPayload> {
        let request = GetPointsBuilder::new(&self.collection, vec![PointId::from(id)])
            .with_payload(true)
            .with_vectors(false)
            .build();

        let response = with_deadline(self.request_timeout, self.transport.get_points(request))
            .await
            .map_err(|status| classify("get point details", status))?;

        response
            .result
            .into_iter()
            .next()
            .map(|point| StoredPayload::from(point.payload))
            .ok_or_else(|| PhotoError::NotFound(format!("Photo {} not found", id)))
    }

    #[instrument(skip(self))]
    async fn list_paths(
        &self,
        limit: u32,
        offset: Option<PointIdentity>,
    ) -> PhotoResult<PhotoPathsResponse> {
        let mut builder = ScrollPointsBuilder::new(&self.collection)
            .limit(limit)
            .with_payload(true)
            .with_vectors(false);

        if let Some(offset) = offset {
            builder = builder.offset(PointId::from(offset));
        }

        let response = with_deadline(self.request_timeout, self.transport.scroll_points(builder.build()))
            .await
            .map_err(|status| classify("scroll points", status))?;

        let next_offset = response
            .next_page_offset
            .as_ref()
            .map(PointIdentity::try_from)
            .transpose()?
            .map(|id| id.to_string());

        Ok(PhotoPathsResponse {
            paths: response
                .result
                .into_iter()
                .map(|point| StoredPayload::from(point.payload).path())
                .collect(),
            next_offset,
        })
    }
}

/// Run one downstream call under a deadline; an elapsed deadline reads as DEADLINE_EXCEEDED.
pub(crate) async fn with_deadline<F, R>(timeout: Duration, call: F) -> Result<R, Status>
where
    F: Future<Output = Result<R, Status>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Status::deadline_exceeded(format!(
            "no response within {:?}",
            timeout
        ))),
    }
}

fn classify(operation: &str, status: Status) -> PhotoError {
    tracing::error!(
        "Failed to {}: {}; grpc code = {:?}",
        operation,
        status.message(),
        status.code()
    );
    PhotoError::from_store_status(&status)
}

fn to_result_item(point: ScoredPoint) -> PhotoResult<PhotoResultItem> {
    let id = point
        .id
        .as_ref()
        .map(PointIdentity::try_from)
        .transpose()?
        .ok_or_else(|| PhotoError::VectorStoreOperationFailed("Missing point ID".to_string()))?;

    let payload = StoredPayload::from(point.payload);

    Ok(PhotoResultItem {
        id: id.to_string(),
        path: payload.path(),
        timestamp: payload.timestamp(),
        score: Some(point.score),
    })
}
