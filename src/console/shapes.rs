//! Generic shape save and location visualization
//!
//! The simple CRUD flow next to the camera lifecycle: non-camera gestures
//! stage a geometry for naming and saving, and previously saved locations
//! can be pulled back onto a visualization layer.

use crate::alerts::UserAlerts;
use crate::backend::types::{LocationProperties, SaveShapeRequest};
use crate::backend::GeoBackend;
use crate::geometry::{Feature, GeoBounds, Geometry};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Validation message for a missing location name
pub const EMPTY_NAME: &str = "Please enter a name for the location.";

/// Message shown when visualize is requested with nothing selected
pub const NOTHING_SELECTED: &str = "Please select at least one location to visualize.";

/// Outcome of a save call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No geometry staged; nothing to save
    NothingStaged,
    /// Validation failed; the staged geometry is kept, no request issued
    Rejected,
    /// Saved and the staging area cleared
    Saved,
    /// Backend rejected or was unreachable; the staged geometry is kept
    Failed,
}

/// ShapeFlow instance
pub struct ShapeFlow<B> {
    backend: Arc<B>,
    alerts: Arc<UserAlerts>,
    staged: Mutex<Option<Geometry>>,
    visualized: Mutex<Vec<Feature<LocationProperties>>>,
}

impl<B: GeoBackend> ShapeFlow<B> {
    pub fn new(backend: Arc<B>, alerts: Arc<UserAlerts>) -> Self {
        Self {
            backend,
            alerts,
            staged: Mutex::new(None),
            visualized: Mutex::new(Vec::new()),
        }
    }

    /// Stage a drawn geometry, replacing whatever was staged before
    pub async fn stage(&self, geometry: Geometry) {
        *self.staged.lock().await = Some(geometry);
    }

    /// Currently staged geometry
    pub async fn staged(&self) -> Option<Geometry> {
        self.staged.lock().await.clone()
    }

    /// Save the staged geometry under `name`
    pub async fn save(&self, name: &str) -> SaveOutcome {
        let mut staged = self.staged.lock().await;
        let Some(geometry) = staged.clone() else {
            return SaveOutcome::NothingStaged;
        };

        let name = name.trim();
        if name.is_empty() {
            drop(staged);
            self.alerts.raise(EMPTY_NAME).await;
            return SaveOutcome::Rejected;
        }

        let request = SaveShapeRequest {
            name: name.to_string(),
            geometry,
        };
        match self.backend.save_shape(request).await {
            Ok(resp) if resp.is_success() => {
                *staged = None;
                tracing::info!(name = %name, "Shape saved");
                SaveOutcome::Saved
            }
            Ok(resp) => {
                drop(staged);
                let message = resp.message.unwrap_or_else(|| "unknown error".to_string());
                self.alerts
                    .raise(format!("Error saving geometry: {}", message))
                    .await;
                SaveOutcome::Failed
            }
            Err(e) => {
                drop(staged);
                self.alerts
                    .raise(format!("Error saving geometry: {}", e.user_message()))
                    .await;
                SaveOutcome::Failed
            }
        }
    }

    /// Pull the selected locations onto the visualization layer.
    ///
    /// Returns the bounds of the rebuilt layer so the caller can fit the
    /// viewport; none when nothing was fetched.
    pub async fn visualize(&self, ids: Vec<u64>) -> Option<GeoBounds> {
        if ids.is_empty() {
            self.alerts.raise(NOTHING_SELECTED).await;
            return None;
        }

        match self.backend.fetch_locations_geojson(ids).await {
            Ok(collection) => {
                let bounds =
                    GeoBounds::covering(collection.features.iter().map(|f| &f.geometry));
                let count = collection.features.len();
                *self.visualized.lock().await = collection.features;
                tracing::info!(count = count, "Visualization layer rebuilt");
                bounds
            }
            Err(e) => {
                self.alerts
                    .raise(format!("Failed to visualize locations: {}", e.user_message()))
                    .await;
                None
            }
        }
    }

    /// Features currently on the visualization layer
    pub async fn visualized(&self) -> Vec<Feature<LocationProperties>> {
        self.visualized.lock().await.clone()
    }

    /// Empty the visualization layer
    pub async fn clear_visualized(&self) {
        self.visualized.lock().await.clear();
    }
}
