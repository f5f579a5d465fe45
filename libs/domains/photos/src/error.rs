use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tonic::Code;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("embedding server unavailable")]
    EmbeddingServiceUnavailable,

    #[error("vector database unavailable")]
    VectorStoreUnavailable,

    #[error("Vector database error: {0}")]
    VectorStoreOperationFailed(String),

    #[error("Embedding error: {0}")]
    EmbeddingFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type PhotoResult<T> = Result<T, PhotoError>;

impl PhotoError {
    /// Stable machine-readable code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            PhotoError::EmbeddingServiceUnavailable => "embedding_server_unavailable",
            PhotoError::VectorStoreUnavailable => "vector_database_unavailable",
            PhotoError::VectorStoreOperationFailed(_) => "vector_database_error",
            PhotoError::EmbeddingFailed(_) => "embedding_error",
            PhotoError::NotFound(_) => "not_found",
            PhotoError::Validation(_) => "invalid_request",
            PhotoError::Config(_) => "configuration_error",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Transient downstream outages; clients are expected to retry these.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PhotoError::EmbeddingServiceUnavailable | PhotoError::VectorStoreUnavailable
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            _ if self.is_recoverable() => StatusCode::SERVICE_UNAVAILABLE,
            PhotoError::NotFound(_) => StatusCode::NOT_FOUND,
            PhotoError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a failed vector store call.
    ///
    /// Unavailable and deadline-exceeded are recoverable; everything else is wrapped.
    /// Callers that treat not-found specially must check for it before classifying.
    pub fn from_store_status(status: &tonic::Status) -> Self {
        match status.code() {
            Code::Unavailable | Code::DeadlineExceeded => PhotoError::VectorStoreUnavailable,
            code => PhotoError::VectorStoreOperationFailed(format!(
                "{} (grpc code = {:?})",
                status.message(),
                code
            )),
        }
    }

    /// Classify a failed call to the embedding service.
    pub fn from_embedding_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            PhotoError::EmbeddingServiceUnavailable
        } else {
            PhotoError::EmbeddingFailed(err.to_string())
        }
    }
}

impl From<JsonRejection> for PhotoError {
    fn from(rejection: JsonRejection) -> Self {
        PhotoError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PhotoError {
    fn from(rejection: QueryRejection) -> Self {
        PhotoError::Validation(rejection.body_text())
    }
}

/// Per-field EXIF encoding failure. Logged and absorbed, never returned to callers.
#[derive(Debug, Error)]
#[error("Skipped EXIF field '{key}': {reason}")]
pub struct EncodingSkipped {
    pub key: String,
    pub reason: String,
}

impl EncodingSkipped {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl From<&PhotoError> for ErrorResponse {
    fn from(err: &PhotoError) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
        }
    }
}

impl IntoResponse for PhotoError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_recoverable() {
            tracing::warn!(error_code = self.code(), "Downstream unavailable: {}", self);
        } else if status.is_server_error() {
            tracing::error!(error_code = self.code(), "Request failed: {}", self);
        } else {
            tracing::info!(error_code = self.code(), "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
