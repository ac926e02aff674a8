//! Push channel wire types

use crate::camera_store::types::CameraRecord;
use serde::{Deserialize, Serialize};

/// Message type announcing a newly created camera
pub const CAMERA_ADDED: &str = "camera_added";

/// Inbound push frame: `{type, camera}`
///
/// Unknown types are expected and ignored; the channel stays forward
/// compatible with message kinds it does not know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub camera: Option<CameraRecord>,
}

/// Event delivered to the console once the provisioning delay has passed
#[derive(Debug, Clone)]
pub enum SyncEvent {
    CameraAdded { record: CameraRecord },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_added_frame_parses() {
        let json = r#"{
            "type": "camera_added",
            "camera": {
                "id": 7,
                "name": "Gate Cam",
                "rtsp_url": "rtsp://x/y",
                "description": "",
                "location": {"type": "Point", "coordinates": [10.2, 36.8]},
                "stream_url": null
            }
        }"#;
        let frame: PushFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.message_type, CAMERA_ADDED);
        assert_eq!(frame.camera.unwrap().id, 7);
    }

    #[test]
    fn test_unknown_frame_without_camera_parses() {
        let frame: PushFrame =
            serde_json::from_str(r#"{"type": "heartbeat"}"#).unwrap();
        assert_eq!(frame.message_type, "heartbeat");
        assert!(frame.camera.is_none());
    }
}
