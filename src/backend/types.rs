//! Backend wire types
//!
//! Shapes match the JSON the backend speaks: snake_case fields, GeoJSON
//! geometries, `{status, message}` envelopes on mutations.

use crate::camera_store::types::{CameraId, CameraRecord};
use crate::geometry::{GeoPoint, Geometry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /cameras/add/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCameraRequest {
    pub name: String,
    pub rtsp_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: GeoPoint,
    /// Client-generated correlation token, echoed back in the push
    /// notification when the backend supports it
    pub client_token: Uuid,
}

/// Response of `POST /cameras/add/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCameraResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub camera_id: Option<CameraId>,
}

impl CreateCameraResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of `POST /save/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveShapeRequest {
    pub name: String,
    pub geometry: Geometry,
}

/// Generic `{status, message}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of `POST /get_locations_geojson/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsRequest {
    pub ids: Vec<u64>,
}

/// Feature properties served by `GET /cameras/api/geojson/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraProperties {
    pub id: CameraId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rtsp_url: String,
    #[serde(default)]
    pub stream_url: Option<String>,
}

impl CameraProperties {
    /// Assemble a camera record from feature properties and geometry
    pub fn into_record(self, location: GeoPoint) -> CameraRecord {
        CameraRecord {
            id: self.id,
            name: self.name,
            rtsp_url: self.rtsp_url,
            description: self.description,
            location,
            stream_url: self.stream_url,
            client_token: None,
        }
    }
}

/// Feature properties served by `POST /get_locations_geojson/`
///
/// Mixed layer: camera features carry stream fields, plain locations only
/// a name and a type label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationProperties {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_camera: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rtsp_url: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
}
