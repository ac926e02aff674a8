//! CameraMarkerStore - camera layer state
//!
//! ## Responsibilities
//!
//! - Keep the in-memory camera registry, keyed by camera id
//! - Maintain one map marker per record (create on first sight, reposition
//!   on update)
//! - Drive stream attachment from popup visibility
//!
//! Upsert is idempotent by id, so bulk-load results and push notifications
//! can interleave in any order.

pub mod popup;
pub mod types;

use crate::stream::StreamAttachments;
use popup::PopupContent;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use types::{CameraId, CameraRecord, Marker, MarkerChange};

struct CameraEntry {
    record: CameraRecord,
    marker: Marker,
    popup_open: bool,
}

/// CameraMarkerStore instance
pub struct CameraMarkerStore {
    cameras: RwLock<HashMap<CameraId, CameraEntry>>,
    attachments: Arc<StreamAttachments>,
}

impl CameraMarkerStore {
    /// Create an empty store over the given attachment manager
    pub fn new(attachments: Arc<StreamAttachments>) -> Self {
        Self {
            cameras: RwLock::new(HashMap::new()),
            attachments,
        }
    }

    /// Insert or update a camera record.
    ///
    /// An existing record absorbs the new fields and its marker is
    /// repositioned. When the record's popup is open, the popup content is
    /// re-rendered and stream attachment re-runs, since the stream URL may
    /// have just become available.
    pub async fn upsert(&self, record: CameraRecord) -> MarkerChange {
        let id = record.id;
        let (change, refresh) = {
            let mut cameras = self.cameras.write().await;
            match cameras.entry(id) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    entry.record.merge_from(record);
                    entry.marker.position = entry.record.location;
                    let refresh = entry.popup_open.then(|| entry.record.clone());
                    (MarkerChange::Updated, refresh)
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(CameraEntry {
                        marker: Marker {
                            position: record.location,
                        },
                        record,
                        popup_open: false,
                    });
                    (MarkerChange::Created, None)
                }
            }
        };

        tracing::info!(camera_id = id, change = ?change, "Camera marker upserted");

        if let Some(record) = refresh {
            self.refresh_open_popup(&record).await;
        }
        change
    }

    /// The record for `id`, when the store knows it
    pub async fn find_by_id(&self, id: CameraId) -> Option<CameraRecord> {
        self.cameras
            .read()
            .await
            .get(&id)
            .map(|entry| entry.record.clone())
    }

    /// The marker for `id`, when the store knows it
    pub async fn marker(&self, id: CameraId) -> Option<Marker> {
        self.cameras.read().await.get(&id).map(|entry| entry.marker)
    }

    /// Number of markers on the camera layer
    pub async fn marker_count(&self) -> usize {
        self.cameras.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.marker_count().await == 0
    }

    /// Rendered popup content for `id`
    pub async fn popup_content(&self, id: CameraId) -> Option<PopupContent> {
        self.find_by_id(id)
            .await
            .map(|record| PopupContent::for_camera(&record))
    }

    /// Popup became visible: render content and run stream attachment.
    ///
    /// Open events can fire repeatedly without a close in between; attach
    /// idempotence absorbs that.
    pub async fn open_popup(&self, id: CameraId) -> Option<PopupContent> {
        let record = {
            let mut cameras = self.cameras.write().await;
            let entry = cameras.get_mut(&id)?;
            entry.popup_open = true;
            entry.record.clone()
        };

        let content = PopupContent::for_camera(&record);
        if let Some(stream_url) = content.stream_url() {
            self.attachments.attach(&record.panel_id(), stream_url).await;
        }
        Some(content)
    }

    /// Popup hid: release the panel. Pairs exhaustively with `open_popup`.
    pub async fn close_popup(&self, id: CameraId) {
        let panel_id = {
            let mut cameras = self.cameras.write().await;
            match cameras.get_mut(&id) {
                Some(entry) => {
                    entry.popup_open = false;
                    entry.record.panel_id()
                }
                None => return,
            }
        };
        self.attachments.detach(&panel_id).await;
    }

    /// Whether the popup for `id` is currently open
    pub async fn is_popup_open(&self, id: CameraId) -> bool {
        self.cameras
            .read()
            .await
            .get(&id)
            .map(|entry| entry.popup_open)
            .unwrap_or(false)
    }

    async fn refresh_open_popup(&self, record: &CameraRecord) {
        let panel_id = record.panel_id();
        self.attachments.detach(&panel_id).await;
        if let Some(stream_url) = record.stream_url.as_deref() {
            if !stream_url.is_empty() {
                self.attachments.attach(&panel_id, stream_url).await;
            }
        }
        tracing::debug!(camera_id = record.id, "Open popup refreshed after upsert");
    }
}
