use foundation::{CanonicalPoint, GeoError};
use serde::{Deserialize, Serialize};

/// A comment in a share point's thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub username: String,
    pub contents: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: u64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Comment {
    pub fn new(
        username: impl Into<String>,
        contents: impl Into<String>,
        timestamp: u64,
        images: Vec<String>,
    ) -> Self {
        Self {
            username: username.into(),
            contents: contents.into(),
            timestamp,
            images,
        }
    }
}

/// A stored share point as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePoint {
    /// Store-assigned identifier; absent only on records that were never stored.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// Creation time of a share point.
///
/// This service writes epoch milliseconds. Document stores that keep a date
/// type hand back an ISO-8601 string, which is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(u64),
    Text(String),
}

impl Timestamp {
    /// Epoch milliseconds, when the store reported them as a number.
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            Timestamp::Millis(ms) => Some(*ms),
            Timestamp::Text(_) => None,
        }
    }
}

impl SharePoint {
    /// Materialize a creation payload as a stored record.
    pub fn from_new(point: NewSharePoint, id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: Some(id.into()),
            name: point.name,
            lat: point.lat,
            lon: point.lon,
            desc: point.desc,
            images: point.images,
            comments: Vec::new(),
            timestamp: Some(Timestamp::Millis(timestamp)),
        }
    }

    /// Location in the canonical frame.
    pub fn position(&self) -> Result<CanonicalPoint, GeoError> {
        CanonicalPoint::new(self.lon, self.lat)
    }
}

/// Creation payload for a share point.
///
/// The location can only be supplied as a [`CanonicalPoint`]; a raw click in
/// display coordinates has to be converted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSharePoint {
    pub name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewSharePoint {
    pub fn new(
        position: CanonicalPoint,
        name: impl Into<String>,
        desc: impl Into<String>,
        images: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lat: position.lat(),
            lon: position.lon(),
            desc: desc.into(),
            images,
        }
    }

    pub fn position(&self) -> Result<CanonicalPoint, GeoError> {
        CanonicalPoint::new(self.lon, self.lat)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// Error body used by every failing endpoint except delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
