//! Geocam Console
//!
//! Client-side camera map console: draw geometries, place camera markers,
//! persist them to the backend, and play live streams inside marker popups.
//!
//! ## Architecture (6 Components)
//!
//! 1. CameraMarkerStore - camera layer state, upsert-by-id
//! 2. CameraFormFlow - "place new camera" interaction
//! 3. StreamAttachments - popup video lifecycle + adaptive stream engine
//! 4. CameraSyncChannel - push notifications, flat-backoff reconnect
//! 5. ShapeFlow - generic shape save / location visualization
//! 6. MapConsole - coordinator: viewport, toolbar, dispatch, start/stop
//!
//! ## Design Principles
//!
//! - One console object constructed at startup; collaborators injected,
//!   no ambient globals
//! - Markers materialize only through the push channel, never from an
//!   HTTP response
//! - Every failure degrades one marker, one stream, or one form

pub mod alerts;
pub mod backend;
pub mod camera_store;
pub mod console;
pub mod error;
pub mod form_flow;
pub mod geometry;
pub mod state;
pub mod stream;
pub mod sync_channel;

pub use error::{Error, Result};
pub use state::AppConfig;
