use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PhotoResult;
use crate::filter::PhotoFilter;
use crate::identity::PointIdentity;
use crate::payload::{DynamicValue, StoredPayload};

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A photo to index: its natural key, capture time, EXIF tags and image embedding.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoItem {
    pub path: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub exif: HashMap<String, DynamicValue>,
    #[serde(rename = "v")]
    pub vector: Vec<f32>,
}

impl PhotoItem {
    pub fn new(path: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            path: path.into(),
            timestamp: None,
            exif: HashMap::new(),
            vector,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_exif(mut self, key: impl Into<String>, value: DynamicValue) -> Self {
        self.exif.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> PointIdentity {
        PointIdentity::derive(&self.path)
    }
}

/// One search or recommendation hit.
///
/// `score` is present for ranked results, `timestamp` whenever the photo has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoResultItem {
    pub id: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoResultsResponse {
    pub items: Vec<PhotoResultItem>,
}

/// Pagination and filtering shared by search and recommend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub filter: Option<PhotoFilter>,
}

impl PageRequest {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or_default()
    }

    pub fn validate(&self) -> PhotoResult<()> {
        match &self.filter {
            Some(filter) => filter.validate(),
            None => Ok(()),
        }
    }
}

// Paging fields must not be `#[serde(flatten)]`ed: flatten cannot carry
// arbitrary-precision numbers.

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPhotosRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub filter: Option<PhotoFilter>,
}

impl SearchPhotosRequest {
    pub fn page(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            offset: self.offset,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendPhotosRequest {
    pub id: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub filter: Option<PhotoFilter>,
}

impl RecommendPhotosRequest {
    pub fn page(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            offset: self.offset,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexRequest {
    pub items: Vec<PhotoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFromIndexRequest {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPathsQuery {
    pub size: Option<u32>,
    pub offset: Option<String>,
}

/// One page of indexed paths; `next_offset` is absent on the last page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPathsResponse {
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<String>,
}

/// Decoded metadata of a single stored photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDetails {
    pub id: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
}

impl PhotoDetails {
    pub fn from_payload(id: PointIdentity, payload: &StoredPayload) -> Self {
        Self {
            id: id.to_string(),
            path: payload.path(),
            timestamp: payload.timestamp(),
            orientation: payload.orientation(),
            camera: payload.camera(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
