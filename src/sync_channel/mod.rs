//! CameraSyncChannel - push notifications for new cameras
//!
//! ## Responsibilities
//!
//! - Hold one persistent WebSocket connection to the backend
//! - Reconnect after a flat backoff, unconditionally and indefinitely (no
//!   retry cap, no circuit breaker)
//! - Parse `{type, camera}` frames; schedule `camera_added` records for
//!   materialization after the provisioning delay, FIFO
//!
//! Transport errors are logged; recovery belongs to the reconnect path.
//! Unknown message types are ignored.

pub mod types;

use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use types::{PushFrame, SyncEvent, CAMERA_ADDED};

struct Scheduled {
    due: tokio::time::Instant,
    event: SyncEvent,
}

/// CameraSyncChannel instance
pub struct CameraSyncChannel {
    endpoint: String,
    reconnect_backoff: Duration,
    provisioning_delay: Duration,
    connection_attempts: AtomicU64,
    schedule_tx: mpsc::UnboundedSender<Scheduled>,
    schedule_rx: Mutex<Option<mpsc::UnboundedReceiver<Scheduled>>>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
}

impl CameraSyncChannel {
    /// Create the channel.
    ///
    /// Returns the channel and the receiver the console drains for
    /// materialization events. Nothing connects until `run` is spawned.
    pub fn new(
        endpoint: String,
        reconnect_backoff: Duration,
        provisioning_delay: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SyncEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (schedule_tx, schedule_rx) = mpsc::unbounded_channel();

        let channel = Arc::new(Self {
            endpoint,
            reconnect_backoff,
            provisioning_delay,
            connection_attempts: AtomicU64::new(0),
            schedule_tx,
            schedule_rx: Mutex::new(Some(schedule_rx)),
            events_tx,
        });
        (channel, events_rx)
    }

    /// Connection attempts made so far
    pub fn connection_attempts(&self) -> u64 {
        self.connection_attempts.load(Ordering::SeqCst)
    }

    /// Connect and keep the channel alive forever.
    ///
    /// Never returns; the owner aborts the task to stop the channel.
    pub async fn run(self: Arc<Self>) {
        // Provisioning-delay dispatcher. Due times are monotone (flat
        // delay), so draining in arrival order preserves FIFO delivery.
        let schedule_rx = self.schedule_rx.lock().await.take();
        if let Some(mut schedule_rx) = schedule_rx {
            let events_tx = self.events_tx.clone();
            tokio::spawn(async move {
                while let Some(item) = schedule_rx.recv().await {
                    tokio::time::sleep_until(item.due).await;
                    let _ = events_tx.send(item.event);
                }
            });
        }

        loop {
            let attempt = self.connection_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match connect_async(self.endpoint.as_str()).await {
                Ok((mut socket, _)) => {
                    tracing::info!(
                        endpoint = %self.endpoint,
                        attempt = attempt,
                        "Push channel ready"
                    );

                    while let Some(frame) = socket.next().await {
                        match frame {
                            Ok(Message::Text(text)) => self.handle_frame(&text),
                            Ok(Message::Close(_)) => {
                                tracing::info!("Push channel closed by server");
                                break;
                            }
                            Ok(_) => {}
                            Err(e) => {
                                // Log only; the reconnect path below owns
                                // recovery.
                                tracing::warn!(error = %e, "Push channel transport error");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        endpoint = %self.endpoint,
                        attempt = attempt,
                        error = %e,
                        "Push channel connect failed"
                    );
                }
            }

            tokio::time::sleep(self.reconnect_backoff).await;
        }
    }

    fn handle_frame(&self, text: &str) {
        let frame: PushFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable push frame dropped");
                return;
            }
        };

        if frame.message_type != CAMERA_ADDED {
            tracing::debug!(
                message_type = %frame.message_type,
                "Ignoring unknown push message type"
            );
            return;
        }

        let Some(record) = frame.camera else {
            tracing::warn!("camera_added frame without a camera payload");
            return;
        };

        tracing::info!(
            camera_id = record.id,
            delay_secs = self.provisioning_delay.as_secs_f64(),
            "Camera announced; scheduling materialization"
        );
        let _ = self.schedule_tx.send(Scheduled {
            due: tokio::time::Instant::now() + self.provisioning_delay,
            event: SyncEvent::CameraAdded { record },
        });
    }
}
