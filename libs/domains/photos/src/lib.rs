//! Photo Search Domain Library
//!
//! Core of the photo-search gateway: text and similarity search over photo embeddings
//! stored in Qdrant, with query vectors produced by an external embedding service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  PhotoService   │  ← search / recommend / details / index maintenance
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────────┐
//! │ PhotoRepository │     │  EmbeddingProvider   │
//! │   (trait)       │     │    (trait)           │
//! └────────┬────────┘     └────────┬─────────────┘
//!          │                       │
//! ┌────────▼──────────────┐ ┌──────▼───────────────┐
//! │ QdrantPhotoRepository │ │ HttpEmbeddingProvider│
//! └────────┬──────────────┘ └──────────────────────┘
//!          │
//! ┌────────▼────────┐
//! │ QdrantTransport │  ← raw RPCs, implemented for `qdrant_client::Qdrant`
//! └─────────────────┘
//! ```
//!
//! Points are keyed by [`PointIdentity`], derived from the photo path, so re-indexing
//! the same file overwrites instead of duplicating. Every downstream failure is
//! classified as recoverable (503, retry later) or not (500).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_photos::{
//!     HttpEmbeddingProvider, PageRequest, PhotoService, QdrantConfig, QdrantPhotoRepository,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = QdrantPhotoRepository::connect(QdrantConfig::from_env()?).await?;
//! let embedding = HttpEmbeddingProvider::from_env()?;
//!
//! let service = PhotoService::new(repository, Arc::new(embedding));
//! let results = service.search("dog on a beach", PageRequest::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod payload;
pub mod qdrant;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, HttpEmbeddingConfig, HttpEmbeddingProvider};
pub use error::{EncodingSkipped, ErrorResponse, PhotoError, PhotoResult};
pub use filter::PhotoFilter;
pub use handlers::{internal_router, public_router};
pub use identity::{PointIdentity, derive_id};
pub use models::{
    DeleteFromIndexRequest, IndexRequest, PageRequest, PhotoDetails, PhotoItem,
    PhotoPathsResponse, PhotoResultItem, PhotoResultsResponse, RecommendPhotosRequest,
    SearchPhotosRequest,
};
pub use payload::{DynamicValue, StoredPayload};
pub use qdrant::{QdrantConfig, QdrantPhotoRepository, QdrantTransport};
pub use repository::PhotoRepository;
pub use service::PhotoService;
