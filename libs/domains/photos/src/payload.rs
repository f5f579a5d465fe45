//! Payload codec: EXIF tags in, typed store values out, and accessors back.

use std::collections::HashMap;

use qdrant_client::qdrant::{
    ListValue, NullValue, Struct, Value as QdrantValue, value::Kind,
};
use serde::Deserialize;

use crate::error::EncodingSkipped;

pub const METADATA_PATH: &str = "path";
pub const METADATA_TIMESTAMP: &str = "timestamp";
pub const METADATA_EXIF: &str = "exif";

pub const EXIF_CAMERA_MAKE: &str = "Make";
pub const EXIF_CAMERA_MODEL: &str = "Model";
pub const EXIF_ORIENTATION: &str = "Orientation";

/// A single EXIF tag value as sent by the indexer.
///
/// Integer vs float follows the JSON text: `6` is an integer, `6.0` a float.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<DynamicValue>),
    /// Anything the store's value model has no mapping for (objects, integers beyond i64).
    Unsupported(serde_json::Value),
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => DynamicValue::Null,
            Value::Bool(b) => DynamicValue::Bool(b),
            Value::Number(n) => {
                // The number keeps its source text: a decimal point makes it a float,
                // anything else must fit an i64 as written (`1e2` does not).
                let text = n.to_string();
                let decoded = if text.contains('.') {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(DynamicValue::Float)
                } else {
                    text.parse::<i64>().ok().map(DynamicValue::Integer)
                };
                decoded.unwrap_or(DynamicValue::Unsupported(Value::Number(n)))
            }
            Value::String(s) => DynamicValue::String(s),
            Value::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from).collect())
            }
            other => DynamicValue::Unsupported(other),
        }
    }
}

/// Encode one tag value into the store's typed value tree.
pub fn encode_value(key: &str, value: &DynamicValue) -> Result<QdrantValue, EncodingSkipped> {
    let kind = match value {
        DynamicValue::Null => Kind::NullValue(NullValue::NullValue as i32),
        DynamicValue::Bool(b) => Kind::BoolValue(*b),
        DynamicValue::Integer(i) => Kind::IntegerValue(*i),
        DynamicValue::Float(f) => Kind::DoubleValue(*f),
        DynamicValue::String(s) => Kind::StringValue(s.clone()),
        DynamicValue::List(items) => {
            let values = items
                .iter()
                .map(|item| encode_value(key, item))
                .collect::<Result<Vec<_>, _>>()?;
            Kind::ListValue(ListValue { values })
        }
        DynamicValue::Unsupported(raw) => {
            return Err(EncodingSkipped::new(
                key,
                format!("unsupported tag value type: {}", raw),
            ));
        }
    };

    Ok(QdrantValue { kind: Some(kind) })
}

/// Encode all EXIF tags, best effort: fields that cannot be encoded are logged and left out.
pub fn encode_exif(tags: &HashMap<String, DynamicValue>) -> HashMap<String, QdrantValue> {
    let mut fields = HashMap::with_capacity(tags.len());

    for (key, value) in tags {
        match encode_value(key, value) {
            Ok(encoded) => {
                fields.insert(key.clone(), encoded);
            }
            Err(skipped) => tracing::warn!("{}", skipped),
        }
    }

    fields
}

/// Build the full stored payload for one photo.
pub fn encode_payload(
    path: &str,
    timestamp: Option<i64>,
    exif: &HashMap<String, DynamicValue>,
) -> HashMap<String, QdrantValue> {
    let mut payload = HashMap::new();
    payload.insert(METADATA_PATH.to_string(), QdrantValue::from(path.to_string()));
    payload.insert(
        METADATA_EXIF.to_string(),
        QdrantValue {
            kind: Some(Kind::StructValue(Struct {
                fields: encode_exif(exif),
            })),
        },
    );

    match timestamp {
        Some(ts) => {
            payload.insert(METADATA_TIMESTAMP.to_string(), QdrantValue::from(ts));
        }
        None => tracing::warn!("Image at path '{}' has no timestamp.", path),
    }

    payload
}

/// Typed payload as read back from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPayload {
    fields: HashMap<String, QdrantValue>,
}

impl StoredPayload {
    pub fn new(fields: HashMap<String, QdrantValue>) -> Self {
        Self { fields }
    }

    pub fn into_fields(self) -> HashMap<String, QdrantValue> {
        self.fields
    }

    /// Every point is written with a path; an empty string stands in for a foreign point.
    pub fn path(&self) -> String {
        match self.kind(METADATA_PATH) {
            Some(Kind::StringValue(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self.kind(METADATA_TIMESTAMP)? {
            Kind::IntegerValue(i) => Some(*i),
            Kind::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn exif_field(&self, name: &str) -> Option<&QdrantValue> {
        match self.kind(METADATA_EXIF)? {
            Kind::StructValue(exif) => exif.fields.get(name),
            _ => None,
        }
    }

    /// EXIF orientation; float values from store round-trips are truncated.
    pub fn orientation(&self) -> Option<i64> {
        match self.exif_field(EXIF_ORIENTATION)?.kind.as_ref()? {
            Kind::IntegerValue(i) => Some(*i),
            Kind::DoubleValue(f) => Some(f.trunc() as i64),
            _ => {
                tracing::warn!("Tag 'Orientation' is neither float64 nor int64.");
                None
            }
        }
    }

    /// Camera description as `Make (Model)`, or whichever of the two is present.
    pub fn camera(&self) -> Option<String> {
        let make = self.exif_string(EXIF_CAMERA_MAKE);
        let model = self.exif_string(EXIF_CAMERA_MODEL);

        match (make, model) {
            (Some(make), Some(model)) => Some(format!("{} ({})", make, model)),
            (Some(make), None) => Some(make),
            (None, model) => model,
        }
    }

    fn exif_string(&self, name: &str) -> Option<String> {
        match self.exif_field(name)?.kind.as_ref()? {
            Kind::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn kind(&self, key: &str) -> Option<&Kind> {
        self.fields.get(key)?.kind.as_ref()
    }
}

impl From<HashMap<String, QdrantValue>> for StoredPayload {
    fn from(fields: HashMap<String, QdrantValue>) -> Self {
        Self::new(fields)
    }
}
