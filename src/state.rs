//! Application configuration
//!
//! Policy values (provisioning delay, reconnect backoff, playlist poll
//! interval, home view) are named fields with named defaults so callers
//! override configuration, not literals.

use crate::geometry::GeoPoint;
use std::time::Duration;

/// Delay between camera creation and marker materialization, covering
/// server-side stream provisioning (policy, not a protocol guarantee)
pub const DEFAULT_PROVISIONING_DELAY_SECS: u64 = 12;

/// Flat reconnect backoff for the push channel
pub const DEFAULT_RECONNECT_BACKOFF_SECS: u64 = 5;

/// Playlist poll interval for the adaptive stream engine, matching the
/// 4-second segment length the backend transcoder produces
pub const DEFAULT_PLAYLIST_POLL_MS: u64 = 4000;

/// HTTP request timeout
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Retained user-facing alerts
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL (HTTP endpoints)
    pub backend_url: String,
    /// Push channel endpoint (WebSocket)
    pub sync_endpoint: String,
    /// Delay before materializing a newly announced camera
    pub provisioning_delay: Duration,
    /// Flat backoff between push-channel reconnect attempts
    pub reconnect_backoff: Duration,
    /// Playlist poll interval for stream sessions
    pub playlist_poll_interval: Duration,
    /// HTTP request timeout
    pub http_timeout: Duration,
    /// Whether the adaptive stream engine is enabled
    pub adaptive_streaming: bool,
    /// Whether video panels can play HLS natively when the engine is absent
    pub native_hls: bool,
    /// Home viewport center
    pub home_center: GeoPoint,
    /// Home viewport zoom
    pub home_zoom: u8,
    /// User alert ring-buffer capacity
    pub alert_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: std::env::var("GEOCAM_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            sync_endpoint: std::env::var("GEOCAM_SYNC_ENDPOINT")
                .unwrap_or_else(|_| "ws://localhost:8000/ws/cameras/".to_string()),
            provisioning_delay: Duration::from_secs(
                env_u64("GEOCAM_PROVISIONING_DELAY_SECS", DEFAULT_PROVISIONING_DELAY_SECS),
            ),
            reconnect_backoff: Duration::from_secs(
                env_u64("GEOCAM_RECONNECT_BACKOFF_SECS", DEFAULT_RECONNECT_BACKOFF_SECS),
            ),
            playlist_poll_interval: Duration::from_millis(
                env_u64("GEOCAM_PLAYLIST_POLL_MS", DEFAULT_PLAYLIST_POLL_MS),
            ),
            http_timeout: Duration::from_secs(
                env_u64("GEOCAM_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            adaptive_streaming: std::env::var("GEOCAM_ADAPTIVE_STREAMING")
                .map(|v| v != "false")
                .unwrap_or(true),
            native_hls: std::env::var("GEOCAM_NATIVE_HLS")
                .map(|v| v == "true")
                .unwrap_or(false),
            // Teboulbou, Gabes Governorate, Tunisia
            home_center: GeoPoint::new(10.2, 36.8),
            home_zoom: 13,
            alert_capacity: DEFAULT_ALERT_CAPACITY,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
