//! Shared fixtures for photo domain integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain_photos::*;
use qdrant_client::qdrant::{
    CollectionOperationResponse, CreateCollection, DeletePoints, GetCollectionInfoResponse,
    GetPoints, GetResponse, PointId, PointStruct, PointsOperationResponse, RecommendPoints,
    RecommendResponse, RetrievedPoint, ScoredPoint, ScrollPoints, ScrollResponse, SearchPoints,
    SearchResponse, UpsertPoints, point_id::PointIdOptions,
    points_selector::PointsSelectorOneOf,
};
use tonic::{Code, Status};

pub const DIMENSION: u64 = 4;

fn key(id: &PointId) -> String {
    match &id.point_id_options {
        Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

#[derive(Default)]
struct State {
    collection_created: bool,
    create_calls: usize,
    points: BTreeMap<String, PointStruct>,
    failure: Option<Code>,
}

/// Qdrant stand-in keeping points in memory, ordered by id.
///
/// Similarity is not computed: every point scores 1.0 and results come back in id order.
#[derive(Clone, Default)]
pub struct InMemoryQdrant {
    state: Arc<Mutex<State>>,
}

impl InMemoryQdrant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `code`.
    pub fn fail_with(&self, code: Code) {
        self.state.lock().unwrap().failure = Some(code);
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().points.len()
    }

    fn check(&self) -> Result<(), Status> {
        match self.state.lock().unwrap().failure {
            Some(code) => Err(Status::new(code, "injected failure")),
            None => Ok(()),
        }
    }

    fn scored(&self, skip_key: Option<&str>, offset: Option<u64>, limit: u64) -> Vec<ScoredPoint> {
        let state = self.state.lock().unwrap();
        state
            .points
            .iter()
            .filter(|(k, _)| Some(k.as_str()) != skip_key)
            .skip(offset.unwrap_or_default() as usize)
            .take(limit as usize)
            .map(|(_, point)| ScoredPoint {
                id: point.id.clone(),
                payload: point.payload.clone(),
                score: 1.0,
                ..Default::default()
            })
            .collect()
    }
}

#[async_trait]
impl QdrantTransport for InMemoryQdrant {
    async fn collection_info(&self, _collection: &str) -> Result<GetCollectionInfoResponse, Status> {
        self.check()?;
        if self.state.lock().unwrap().collection_created {
            Ok(GetCollectionInfoResponse::default())
        } else {
            Err(Status::not_found("collection does not exist"))
        }
    }

    async fn create_collection(
        &self,
        _request: CreateCollection,
    ) -> Result<CollectionOperationResponse, Status> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.collection_created = true;
        state.create_calls += 1;
        Ok(CollectionOperationResponse {
            result: true,
            ..Default::default()
        })
    }

    async fn upsert_points(
        &self,
        request: UpsertPoints,
    ) -> Result<PointsOperationResponse, Status> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        for point in request.points {
            let id = point.id.as_ref().map(key).unwrap_or_default();
            state.points.insert(id, point);
        }
        Ok(PointsOperationResponse::default())
    }

    async fn delete_points(
        &self,
        request: DeletePoints,
    ) -> Result<PointsOperationResponse, Status> {
        self.check()?;
        let ids = match request.points.and_then(|s| s.points_selector_one_of) {
            Some(PointsSelectorOneOf::Points(list)) => list.ids,
            _ => return Err(Status::invalid_argument("only id selectors are supported")),
        };

        let mut state = self.state.lock().unwrap();
        for id in &ids {
            state.points.remove(&key(id));
        }
        Ok(PointsOperationResponse::default())
    }

    async fn search_points(&self, request: SearchPoints) -> Result<SearchResponse, Status> {
        self.check()?;
        Ok(SearchResponse {
            result: self.scored(None, request.offset, request.limit),
            ..Default::default()
        })
    }

    async fn recommend_points(
        &self,
        request: RecommendPoints,
    ) -> Result<RecommendResponse, Status> {
        self.check()?;
        let seed = request.positive.first().map(key).unwrap_or_default();
        if !seed.is_empty() && !self.state.lock().unwrap().points.contains_key(&seed) {
            return Err(Status::invalid_argument(format!("No point with id {}", seed)));
        }

        Ok(RecommendResponse {
            result: self.scored(Some(&seed), request.offset, request.limit),
            ..Default::default()
        })
    }

    async fn get_points(&self, request: GetPoints) -> Result<GetResponse, Status> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let result = request
            .ids
            .iter()
            .filter_map(|id| state.points.get(&key(id)))
            .map(|point| RetrievedPoint {
                id: point.id.clone(),
                payload: point.payload.clone(),
                ..Default::default()
            })
            .collect();
        Ok(GetResponse {
            result,
            ..Default::default()
        })
    }

    async fn scroll_points(&self, request: ScrollPoints) -> Result<ScrollResponse, Status> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let start = request.offset.as_ref().map(key).unwrap_or_default();
        let limit = request.limit.unwrap_or(10) as usize;

        let mut page: Vec<&PointStruct> = state
            .points
            .range(start..)
            .map(|(_, point)| point)
            .take(limit + 1)
            .collect();
        let next_page_offset = if page.len() > limit {
            page.pop().and_then(|point| point.id.clone())
        } else {
            None
        };

        Ok(ScrollResponse {
            result: page
                .into_iter()
                .map(|point| RetrievedPoint {
                    id: point.id.clone(),
                    payload: point.payload.clone(),
                    ..Default::default()
                })
                .collect(),
            next_page_offset,
            ..Default::default()
        })
    }
}

/// Embedding provider returning a fixed vector, or a fixed error.
pub struct StaticEmbedding {
    pub unavailable: bool,
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedding {
    async fn embed(&self, _query: &str) -> PhotoResult<Vec<f32>> {
        if self.unavailable {
            Err(PhotoError::EmbeddingServiceUnavailable)
        } else {
            Ok(vec![0.5; DIMENSION as usize])
        }
    }
}

pub fn test_config() -> QdrantConfig {
    QdrantConfig {
        vector_size: DIMENSION,
        ..QdrantConfig::default().with_collection("photos_test")
    }
}

pub async fn repository(store: &InMemoryQdrant) -> QdrantPhotoRepository<InMemoryQdrant> {
    QdrantPhotoRepository::with_transport(store.clone(), &test_config())
        .await
        .unwrap()
}

pub async fn service(
    store: &InMemoryQdrant,
    embedding_unavailable: bool,
) -> Arc<PhotoService<QdrantPhotoRepository<InMemoryQdrant>>> {
    let embedding = StaticEmbedding {
        unavailable: embedding_unavailable,
    };
    Arc::new(PhotoService::new(
        repository(store).await,
        Arc::new(embedding),
    ))
}

pub fn photo(path: &str) -> PhotoItem {
    PhotoItem::new(path, vec![0.1; DIMENSION as usize])
}
