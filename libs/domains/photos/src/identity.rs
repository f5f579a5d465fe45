//! Content-addressed point identities.
//!
//! Every photo is keyed in the vector store by a 16-byte identity derived from its
//! path, so re-indexing the same path overwrites the existing point and deleting a
//! path never needs a lookup first.

use std::fmt;
use std::str::FromStr;

use qdrant_client::qdrant::PointId;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::error::PhotoError;

/// SHA-1 yields 20 bytes; points are keyed by the trailing 16.
const DIGEST_OFFSET: usize = 4;

/// Identity of a photo point in the vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointIdentity(Uuid);

impl PointIdentity {
    /// Derive the identity of the photo stored at `path`.
    ///
    /// The digest and truncation offset are part of the storage format: points written
    /// by earlier indexers must keep resolving to the same identity.
    pub fn derive(path: &str) -> Self {
        let digest = Sha1::digest(path.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[DIGEST_OFFSET..]);
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Lowercase hex without separators.
    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

/// Shorthand for [`PointIdentity::derive`].
pub fn derive_id(path: &str) -> PointIdentity {
    PointIdentity::derive(path)
}

impl fmt::Display for PointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PointIdentity {
    type Err = PhotoError;

    /// Accepts both the hyphenated form the store returns and plain 32-digit hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| PhotoError::Validation(format!("Invalid photo id '{}': {}", s, e)))
    }
}

impl From<Uuid> for PointIdentity {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<PointIdentity> for PointId {
    fn from(id: PointIdentity) -> Self {
        PointId::from(id.to_string())
    }
}

impl TryFrom<&PointId> for PointIdentity {
    type Error = PhotoError;

    fn try_from(point_id: &PointId) -> Result<Self, Self::Error> {
        use qdrant_client::qdrant::point_id::PointIdOptions;

        match &point_id.point_id_options {
            Some(PointIdOptions::Uuid(uuid_str)) => uuid_str.parse(),
            Some(PointIdOptions::Num(num)) => Ok(Self(Uuid::from_u128(*num as u128))),
            None => Err(PhotoError::VectorStoreOperationFailed(
                "Missing point ID".to_string(),
            )),
        }
    }
}
