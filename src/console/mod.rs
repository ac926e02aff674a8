//! MapConsole - top-level coordinator
//!
//! ## Responsibilities
//!
//! - Own the viewport and the drawing toolbar
//! - Dispatch completed drawing gestures: camera placement to the form
//!   flow, everything else to the shape flow
//! - Start the initial bulk camera load and the push channel together (no
//!   ordering dependency; upsert is idempotent by id)
//! - Apply push events: upsert the store, close out the pending form flow
//!
//! One console is constructed at startup with its collaborators injected;
//! there are no ambient globals. `start()` spawns the background tasks,
//! `stop()` aborts them.

pub mod draw;
pub mod shapes;

use crate::alerts::UserAlerts;
use crate::backend::GeoBackend;
use crate::camera_store::popup::PopupAction;
use crate::camera_store::CameraMarkerStore;
use crate::error::Result;
use crate::form_flow::CameraFormFlow;
use crate::geometry::{GeoBounds, GeoPoint};
use crate::state::AppConfig;
use crate::sync_channel::types::SyncEvent;
use crate::sync_channel::CameraSyncChannel;
use draw::{DrawOutput, DrawTool, DrawToolbar};
use shapes::ShapeFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

/// Map viewport: center plus zoom level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Viewport {
    pub fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    /// Center on `bounds` and pick the zoom that fits them
    pub fn fit_bounds(&mut self, bounds: &GeoBounds) {
        self.center = bounds.center();
        self.zoom = zoom_for_span(bounds.span());
    }
}

/// Zoom level whose ~360/2^z degree window covers `span`
fn zoom_for_span(span: f64) -> u8 {
    if span <= 0.0 {
        return 18;
    }
    let zoom = (360.0 / span).log2().floor();
    zoom.clamp(0.0, 18.0) as u8
}

/// MapConsole instance
pub struct MapConsole<B> {
    config: AppConfig,
    backend: Arc<B>,
    store: Arc<CameraMarkerStore>,
    form: Arc<CameraFormFlow<B>>,
    shapes: Arc<ShapeFlow<B>>,
    alerts: Arc<UserAlerts>,
    toolbar: DrawToolbar,
    viewport: RwLock<Viewport>,
    channel: Arc<CameraSyncChannel>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<SyncEvent>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: GeoBackend> MapConsole<B> {
    /// Wire the console from its collaborators
    pub fn new(
        config: AppConfig,
        backend: Arc<B>,
        store: Arc<CameraMarkerStore>,
        form: Arc<CameraFormFlow<B>>,
        shapes: Arc<ShapeFlow<B>>,
        alerts: Arc<UserAlerts>,
    ) -> Self {
        let (channel, events_rx) = CameraSyncChannel::new(
            config.sync_endpoint.clone(),
            config.reconnect_backoff,
            config.provisioning_delay,
        );
        let viewport = Viewport {
            center: config.home_center,
            zoom: config.home_zoom,
        };

        Self {
            config,
            backend,
            store,
            form,
            shapes,
            alerts,
            toolbar: DrawToolbar::default(),
            viewport: RwLock::new(viewport),
            channel,
            events_rx: Mutex::new(Some(events_rx)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start the console: push channel, event applier, initial bulk load
    pub async fn start(self: Arc<Self>) -> Result<()> {
        {
            let mut tasks = self.tasks.lock().await;
            tasks.push(tokio::spawn(self.channel.clone().run()));

            if let Some(mut events_rx) = self.events_rx.lock().await.take() {
                let console = Arc::clone(&self);
                tasks.push(tokio::spawn(async move {
                    while let Some(event) = events_rx.recv().await {
                        console.apply_sync_event(event).await;
                    }
                }));
            }
        }

        self.load_cameras().await;
        tracing::info!("Map console started");
        Ok(())
    }

    /// Stop the background tasks
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        tracing::info!("Map console stopped");
    }

    /// Initial bulk load of existing cameras
    async fn load_cameras(&self) {
        match self.backend.fetch_cameras_geojson().await {
            Ok(collection) => {
                let mut loaded = 0usize;
                for feature in collection.features {
                    let Some(location) = feature.geometry.as_point() else {
                        tracing::warn!("Camera feature without point geometry skipped");
                        continue;
                    };
                    let record = feature.properties.into_record(location);
                    self.store.upsert(record).await;
                    loaded += 1;
                }
                tracing::info!(count = loaded, "Existing cameras loaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Initial camera load failed");
                self.alerts
                    .raise("Error loading existing cameras. Please check the console.")
                    .await;
            }
        }
    }

    /// Apply one push event: materialize the marker, close out a pending
    /// submission
    pub async fn apply_sync_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::CameraAdded { record } => {
                let token = record.client_token;
                self.store.upsert(record).await;
                self.form.confirm(token).await;
            }
        }
    }

    /// Dispatch a completed drawing gesture
    pub async fn handle_draw_completed(&self, output: DrawOutput) {
        match output.tool {
            DrawTool::CameraPlacement => {
                // The toolbar's scratch geometry is discarded; the form
                // flow owns its own transient marker.
                let Some(point) = output.geometry.as_point() else {
                    tracing::warn!("Camera placement without point geometry ignored");
                    return;
                };
                self.form.begin_placement(point).await;
            }
            _ => {
                self.shapes.stage(output.geometry).await;
            }
        }
    }

    /// Bound popup action handlers.
    ///
    /// Editing and deletion are stub hooks in this console.
    pub async fn handle_popup_action(&self, action: PopupAction) {
        match action {
            PopupAction::EditCamera { id } => {
                tracing::warn!(camera_id = id, "Camera editing is not wired up yet");
            }
            PopupAction::DeleteCamera { id } => {
                tracing::warn!(camera_id = id, "Camera deletion is not wired up yet");
            }
        }
    }

    /// Visualize the selected saved locations and fit the viewport
    pub async fn visualize_locations(&self, ids: Vec<u64>) {
        if let Some(bounds) = self.shapes.visualize(ids).await {
            self.viewport.write().await.fit_bounds(&bounds);
        }
    }

    /// Clear the visualization layer and return home
    pub async fn clear_visualized(&self) {
        self.shapes.clear_visualized().await;
        self.viewport
            .write()
            .await
            .set_view(self.config.home_center, self.config.home_zoom);
    }

    pub async fn viewport(&self) -> Viewport {
        *self.viewport.read().await
    }

    pub fn toolbar(&self) -> &DrawToolbar {
        &self.toolbar
    }

    pub fn store(&self) -> &Arc<CameraMarkerStore> {
        &self.store
    }

    pub fn form(&self) -> &Arc<CameraFormFlow<B>> {
        &self.form
    }

    pub fn shapes(&self) -> &Arc<ShapeFlow<B>> {
        &self.shapes
    }

    pub fn alerts(&self) -> &Arc<UserAlerts> {
        &self.alerts
    }

    pub fn channel(&self) -> &Arc<CameraSyncChannel> {
        &self.channel
    }
}
