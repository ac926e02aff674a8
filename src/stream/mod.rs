//! StreamAttachments - popup video lifecycle
//!
//! ## Responsibilities
//!
//! - Bind video panels to stream URLs when a popup becomes visible
//! - Release sessions when the popup hides (pause, clear source, destroy)
//! - Supervise session errors: ignore non-fatal, retry network, recover
//!   media, give up and show a notice for anything else
//!
//! Attach and detach are both idempotent. Popup open events can fire twice
//! without a close in between; the second attach must not create a second
//! session. Detach without an attachment is a safe no-op.

pub mod hls;
pub mod panel;

use hls::{ErrorCategory, HlsEngine, SessionCommand, SessionError};
use panel::{PanelId, PanelSurface};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

/// Notice shown when no playback path exists for the stream
pub const UNSUPPORTED_NOTICE: &str = "Playback is not supported in this environment.";

/// Notice shown when a session dies beyond recovery
pub const STREAM_FAILED_NOTICE: &str = "Stream failed to load due to a fatal error.";

/// Outcome of an attach call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// An attachment already existed for the panel; nothing was done
    AlreadyAttached,
    /// A new adaptive-stream session now drives the panel
    Session,
    /// The panel plays the source natively
    Native,
    /// No playback path; the panel shows a notice instead
    Unsupported,
}

/// Outcome of a detach call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    Detached,
    NoAttachment,
}

struct SessionBinding {
    handle: hls::HlsSessionHandle,
    supervisor: JoinHandle<()>,
}

struct Attachment {
    surface: Arc<RwLock<PanelSurface>>,
    session: Option<SessionBinding>,
}

/// StreamAttachments instance
pub struct StreamAttachments {
    engine: Option<Arc<HlsEngine>>,
    native_hls: bool,
    entries: RwLock<HashMap<PanelId, Attachment>>,
}

impl StreamAttachments {
    /// Create the manager.
    ///
    /// `engine` is the adaptive-stream engine when one is available in this
    /// environment; `native_hls` says whether panels can play the container
    /// without one.
    pub fn new(engine: Option<Arc<HlsEngine>>, native_hls: bool) -> Self {
        Self {
            engine,
            native_hls,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Bind `panel_id` to `stream_url`. Idempotent per panel.
    pub async fn attach(&self, panel_id: &str, stream_url: &str) -> AttachOutcome {
        let mut entries = self.entries.write().await;
        if entries.contains_key(panel_id) {
            tracing::debug!(panel_id = %panel_id, "Attach skipped - panel already attached");
            return AttachOutcome::AlreadyAttached;
        }

        let (attachment, outcome) = match &self.engine {
            Some(engine) => {
                let (handle, errors) = engine.start_session(stream_url);
                let surface = Arc::new(RwLock::new(PanelSurface::Session {
                    source: stream_url.to_string(),
                }));
                let supervisor = tokio::spawn(supervise(
                    errors,
                    handle.command_sender(),
                    surface.clone(),
                ));
                (
                    Attachment {
                        surface,
                        session: Some(SessionBinding { handle, supervisor }),
                    },
                    AttachOutcome::Session,
                )
            }
            None if self.native_hls => (
                Attachment {
                    surface: Arc::new(RwLock::new(PanelSurface::Native {
                        source: stream_url.to_string(),
                    })),
                    session: None,
                },
                AttachOutcome::Native,
            ),
            None => (
                Attachment {
                    surface: Arc::new(RwLock::new(PanelSurface::Notice(
                        UNSUPPORTED_NOTICE.to_string(),
                    ))),
                    session: None,
                },
                AttachOutcome::Unsupported,
            ),
        };

        tracing::debug!(panel_id = %panel_id, outcome = ?outcome, "Panel attached");
        entries.insert(panel_id.to_string(), attachment);
        outcome
    }

    /// Release whatever is bound to `panel_id`. Safe with no attachment.
    pub async fn detach(&self, panel_id: &str) -> DetachOutcome {
        let attachment = {
            let mut entries = self.entries.write().await;
            entries.remove(panel_id)
        };

        let Some(attachment) = attachment else {
            return DetachOutcome::NoAttachment;
        };

        if let Some(binding) = attachment.session {
            binding.handle.destroy();
            binding.supervisor.abort();
        }
        *attachment.surface.write().await = PanelSurface::Empty;

        tracing::debug!(panel_id = %panel_id, "Panel detached");
        DetachOutcome::Detached
    }

    /// Whether an attachment exists for the panel
    pub async fn is_attached(&self, panel_id: &str) -> bool {
        self.entries.read().await.contains_key(panel_id)
    }

    /// Current surface of the panel, when attached
    pub async fn surface(&self, panel_id: &str) -> Option<PanelSurface> {
        let entries = self.entries.read().await;
        match entries.get(panel_id) {
            Some(attachment) => Some(attachment.surface.read().await.clone()),
            None => None,
        }
    }

    /// Number of live attachments
    pub async fn attachment_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// React to session errors for one panel.
///
/// Non-fatal errors are the session's own problem. Fatal network errors ask
/// the session to resume loading; fatal media errors ask it to rebuild the
/// decode pipeline; anything else kills the session and leaves a notice on
/// the panel.
async fn supervise(
    mut errors: mpsc::UnboundedReceiver<SessionError>,
    commands: mpsc::UnboundedSender<SessionCommand>,
    surface: Arc<RwLock<PanelSurface>>,
) {
    while let Some(error) = errors.recv().await {
        if !error.fatal {
            tracing::trace!(detail = %error.detail, "Non-fatal stream error ignored");
            continue;
        }

        match error.category {
            ErrorCategory::Network => {
                tracing::warn!(detail = %error.detail, "Fatal network error, resuming load");
                let _ = commands.send(SessionCommand::StartLoad);
            }
            ErrorCategory::Media => {
                tracing::warn!(detail = %error.detail, "Fatal media error, recovering");
                let _ = commands.send(SessionCommand::RecoverMediaError);
            }
            ErrorCategory::Other => {
                tracing::error!(detail = %error.detail, "Unrecoverable stream error");
                let _ = commands.send(SessionCommand::Destroy);
                *surface.write().await = PanelSurface::Notice(STREAM_FAILED_NOTICE.to_string());
                break;
            }
        }
    }
}
