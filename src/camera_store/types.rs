//! Camera record types

use crate::geometry::GeoPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Camera identifier, assigned by the backend
pub type CameraId = u64;

/// A materialized camera as the backend announces it
///
/// `stream_url` stays absent until the backend's transcoding pipeline has
/// produced a playable URL; it may arrive in a later notification than the
/// record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub id: CameraId,
    pub name: String,
    pub rtsp_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Correlation token echoed back from the create request, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<Uuid>,
}

impl CameraRecord {
    /// Merge a newer revision of the same camera into this record.
    ///
    /// Required fields replace; optional fields replace only when the new
    /// revision carries a value, so a notification without a stream URL
    /// never erases one already known.
    pub fn merge_from(&mut self, newer: CameraRecord) {
        self.name = newer.name;
        self.rtsp_url = newer.rtsp_url;
        self.location = newer.location;
        if newer.description.is_some() {
            self.description = newer.description;
        }
        if newer.stream_url.is_some() {
            self.stream_url = newer.stream_url;
        }
        if newer.client_token.is_some() {
            self.client_token = newer.client_token;
        }
    }

    /// Video panel id for this camera's popup
    pub fn panel_id(&self) -> String {
        format!("camera-video-{}", self.id)
    }
}

/// Marker placed on the camera layer for one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: GeoPoint,
}

/// Outcome of an upsert, for callers that log transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerChange {
    /// A new marker was created on the camera layer
    Created,
    /// An existing marker was updated in place
    Updated,
}
