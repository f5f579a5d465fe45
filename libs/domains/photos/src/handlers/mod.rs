//! Thin axum handlers for the public and internal photo APIs

mod extract;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;

use crate::error::PhotoResult;
use crate::models::{
    DeleteFromIndexRequest, IndexRequest, ListPathsQuery, PhotoDetails, PhotoPathsResponse,
    PhotoResultsResponse, RecommendPhotosRequest, SearchPhotosRequest, SuccessResponse,
};
use crate::repository::PhotoRepository;
use crate::service::PhotoService;

pub use extract::{ApiJson, ApiQuery};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Router for client-facing queries. Mounted under `/api/v1` by the gateway.
pub fn public_router<R: PhotoRepository + 'static>(service: Arc<PhotoService<R>>) -> Router {
    Router::new()
        .route("/photos/search", post(search_photos))
        .route("/photos/recommend", post(recommend_photos))
        .route("/photos/{id}", get(get_photo))
        .with_state(service)
}

/// Router for the indexer and probes. Not meant to be exposed publicly.
pub fn internal_router<R: PhotoRepository + 'static>(service: Arc<PhotoService<R>>) -> Router {
    Router::new()
        .route(
            "/v1/index",
            get(list_index).post(add_to_index).delete(delete_from_index),
        )
        .route("/_health/{type}", get(health))
        .with_state(service)
}

// ===== Public =====

pub async fn search_photos<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    ApiJson(request): ApiJson<SearchPhotosRequest>,
) -> PhotoResult<Json<PhotoResultsResponse>> {
    let results = service.search(&request.query, request.page()).await?;
    Ok(Json(results))
}

pub async fn recommend_photos<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    ApiJson(request): ApiJson<RecommendPhotosRequest>,
) -> PhotoResult<Json<PhotoResultsResponse>> {
    let results = service.recommend(&request.id, request.page()).await?;
    Ok(Json(results))
}

pub async fn get_photo<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    Path(id): Path<String>,
) -> PhotoResult<Json<PhotoDetails>> {
    let details = service.get_details(&id).await?;
    Ok(Json(details))
}

// ===== Internal =====

pub async fn list_index<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    ApiQuery(query): ApiQuery<ListPathsQuery>,
) -> PhotoResult<Json<PhotoPathsResponse>> {
    let page = service
        .list_paths(query.size, query.offset.as_deref())
        .await?;
    Ok(Json(page))
}

pub async fn add_to_index<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    ApiJson(request): ApiJson<IndexRequest>,
) -> PhotoResult<Json<SuccessResponse>> {
    service.upsert(request.items).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn delete_from_index<R: PhotoRepository>(
    State(service): State<Arc<PhotoService<R>>>,
    ApiJson(request): ApiJson<DeleteFromIndexRequest>,
) -> PhotoResult<Json<SuccessResponse>> {
    service.delete(request.items).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn health(Path(kind): Path<String>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        kind,
    })
}
