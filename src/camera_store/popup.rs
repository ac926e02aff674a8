//! Declarative popup content for camera markers
//!
//! A record is shaped into a content descriptor here; behavior is bound
//! elsewhere by action identifier. Data shaping and event wiring stay
//! decoupled.

use super::types::{CameraId, CameraRecord};
use serde::{Deserialize, Serialize};

/// What the popup body shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopupBody {
    /// Live video panel bound to the camera's stream
    Video {
        panel_id: String,
        stream_url: String,
    },
    /// Inert notice shown while no stream URL is known
    NoStream,
}

/// Action identifiers a renderer can bind handlers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PopupAction {
    EditCamera { id: CameraId },
    DeleteCamera { id: CameraId },
}

/// Rendered popup content descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    pub body: PopupBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<PopupAction>,
}

impl PopupContent {
    /// Shape a camera record into its popup descriptor
    pub fn for_camera(record: &CameraRecord) -> Self {
        let body = match record.stream_url.as_deref() {
            Some(stream_url) if !stream_url.is_empty() => PopupBody::Video {
                panel_id: record.panel_id(),
                stream_url: stream_url.to_string(),
            },
            _ => PopupBody::NoStream,
        };

        Self {
            title: record.name.clone(),
            body,
            description: record.description.clone(),
            actions: vec![
                PopupAction::EditCamera { id: record.id },
                PopupAction::DeleteCamera { id: record.id },
            ],
        }
    }

    /// Stream URL shown in the popup, when one is bound
    pub fn stream_url(&self) -> Option<&str> {
        match &self.body {
            PopupBody::Video { stream_url, .. } => Some(stream_url),
            PopupBody::NoStream => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoPoint;

    fn record(stream_url: Option<&str>) -> CameraRecord {
        CameraRecord {
            id: 7,
            name: "Gate Cam".to_string(),
            rtsp_url: "rtsp://x/y".to_string(),
            description: Some("north gate".to_string()),
            location: GeoPoint::new(10.2, 36.8),
            stream_url: stream_url.map(str::to_string),
            client_token: None,
        }
    }

    #[test]
    fn test_popup_with_stream_binds_video_panel() {
        let content = PopupContent::for_camera(&record(Some("https://x/stream.m3u8")));
        assert_eq!(content.title, "Gate Cam");
        assert_eq!(content.stream_url(), Some("https://x/stream.m3u8"));
        assert_eq!(
            content.body,
            PopupBody::Video {
                panel_id: "camera-video-7".to_string(),
                stream_url: "https://x/stream.m3u8".to_string(),
            }
        );
    }

    #[test]
    fn test_popup_without_stream_is_inert() {
        let content = PopupContent::for_camera(&record(None));
        assert_eq!(content.body, PopupBody::NoStream);
        assert!(content.stream_url().is_none());
    }

    #[test]
    fn test_actions_carry_camera_id() {
        let content = PopupContent::for_camera(&record(None));
        assert!(content
            .actions
            .contains(&PopupAction::DeleteCamera { id: 7 }));
    }
}
