//! CameraFormFlow - the "place new camera" interaction
//!
//! ## States
//!
//! `Idle -> Placing -> AwaitingConfirmation -> Idle` on the success path,
//! `Placing -> Idle` on cancel. The transient placement marker lives only
//! inside this flow; a permanent marker appears solely through the sync
//! channel confirming creation, never optimistically.
//!
//! Correlation: every create request carries a client-generated token. A
//! notification echoing the token closes the matching submission; a
//! notification without one falls back to closing the most recent pending
//! submission.

use crate::alerts::UserAlerts;
use crate::backend::types::CreateCameraRequest;
use crate::backend::GeoBackend;
use crate::geometry::GeoPoint;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Validation message shown when required fields are missing
pub const INCOMPLETE_DETAILS: &str = "Camera details not complete. Not saving.";

/// Fields the inline form collects
#[derive(Debug, Clone, Default)]
pub struct CameraForm {
    pub name: String,
    pub rtsp_url: String,
    pub description: Option<String>,
}

/// Transient draft behind the placement marker; never persisted
#[derive(Debug, Clone)]
struct CameraDraft {
    name: String,
    rtsp_url: String,
    description: Option<String>,
    location: GeoPoint,
}

enum FormState {
    Idle,
    Placing { draft: CameraDraft },
    AwaitingConfirmation { token: Uuid },
}

/// Observable phase of the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Placing,
    AwaitingConfirmation,
}

/// Outcome of a submit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No placement in progress; nothing to submit
    NotPlacing,
    /// Validation failed; still placing, no request was issued
    Rejected,
    /// Create request accepted; awaiting the push confirmation
    Submitted { token: Uuid },
    /// Backend rejected or was unreachable; flow returned to idle
    Failed,
}

/// CameraFormFlow instance
pub struct CameraFormFlow<B> {
    backend: Arc<B>,
    alerts: Arc<UserAlerts>,
    state: Mutex<FormState>,
}

impl<B: GeoBackend> CameraFormFlow<B> {
    pub fn new(backend: Arc<B>, alerts: Arc<UserAlerts>) -> Self {
        Self {
            backend,
            alerts,
            state: Mutex::new(FormState::Idle),
        }
    }

    /// A placement gesture landed at `point`: drop a transient draggable
    /// marker there and show the inline form. Replaces any earlier
    /// transient marker.
    pub async fn begin_placement(&self, point: GeoPoint) {
        let mut state = self.state.lock().await;
        if matches!(*state, FormState::AwaitingConfirmation { .. }) {
            tracing::debug!("New placement started while a submission was pending");
        }
        *state = FormState::Placing {
            draft: CameraDraft {
                name: String::new(),
                rtsp_url: String::new(),
                description: None,
                location: point,
            },
        };
        tracing::info!(lng = point.lng, lat = point.lat, "Camera placement started");
    }

    /// The placement marker was dragged before submission
    pub async fn drag_to(&self, point: GeoPoint) {
        let mut state = self.state.lock().await;
        if let FormState::Placing { draft } = &mut *state {
            draft.location = point;
        }
    }

    /// Position of the transient placement marker, while one exists
    pub async fn placement(&self) -> Option<GeoPoint> {
        match &*self.state.lock().await {
            FormState::Placing { draft } => Some(draft.location),
            _ => None,
        }
    }

    pub async fn phase(&self) -> FormPhase {
        match &*self.state.lock().await {
            FormState::Idle => FormPhase::Idle,
            FormState::Placing { .. } => FormPhase::Placing,
            FormState::AwaitingConfirmation { .. } => FormPhase::AwaitingConfirmation,
        }
    }

    /// Submit the inline form.
    ///
    /// Empty (after trimming) name or RTSP URL fails validation in place:
    /// the flow stays in `Placing` and no request is issued. A valid
    /// submission posts the create request and waits for the push channel;
    /// the HTTP response alone never materializes a marker.
    pub async fn submit(&self, form: CameraForm) -> SubmitOutcome {
        let mut state = self.state.lock().await;

        let draft = match &mut *state {
            FormState::Placing { draft } => draft,
            _ => return SubmitOutcome::NotPlacing,
        };

        let name = form.name.trim();
        let rtsp_url = form.rtsp_url.trim();
        if name.is_empty() || rtsp_url.is_empty() {
            drop(state);
            self.alerts.raise(INCOMPLETE_DETAILS).await;
            return SubmitOutcome::Rejected;
        }

        draft.name = name.to_string();
        draft.rtsp_url = rtsp_url.to_string();
        draft.description = form
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let token = Uuid::new_v4();
        let request = CreateCameraRequest {
            name: draft.name.clone(),
            rtsp_url: draft.rtsp_url.clone(),
            description: draft.description.clone(),
            location: draft.location,
            client_token: token,
        };

        tracing::info!(name = %request.name, token = %token, "Submitting camera create request");

        match self.backend.create_camera(request).await {
            Ok(resp) if resp.is_success() => {
                *state = FormState::AwaitingConfirmation { token };
                SubmitOutcome::Submitted { token }
            }
            Ok(resp) => {
                let message = resp.message.unwrap_or_else(|| "unknown error".to_string());
                *state = FormState::Idle;
                drop(state);
                self.alerts
                    .raise(format!("Failed to add camera: {}", message))
                    .await;
                SubmitOutcome::Failed
            }
            Err(e) => {
                *state = FormState::Idle;
                drop(state);
                self.alerts
                    .raise(format!("Error adding camera: {}", e.user_message()))
                    .await;
                SubmitOutcome::Failed
            }
        }
    }

    /// The form popup closed without saving: tear the transient marker
    /// down immediately, no backend call.
    pub async fn cancel(&self) -> bool {
        let mut state = self.state.lock().await;
        match *state {
            FormState::Placing { .. } => {
                *state = FormState::Idle;
                tracing::info!("Camera placement cancelled");
                true
            }
            _ => false,
        }
    }

    /// The sync channel confirmed a camera creation.
    ///
    /// `token` is the correlation token the notification carried, when the
    /// backend echoed one. Returns whether a pending submission was closed
    /// out (transient marker and form torn down).
    pub async fn confirm(&self, token: Option<Uuid>) -> bool {
        let mut state = self.state.lock().await;
        let pending = match &*state {
            FormState::AwaitingConfirmation { token } => *token,
            _ => return false,
        };

        if let Some(echoed) = token {
            if echoed != pending {
                tracing::debug!(
                    echoed = %echoed,
                    pending = %pending,
                    "Notification token does not match pending submission"
                );
                return false;
            }
        }

        *state = FormState::Idle;
        tracing::info!("Pending camera submission confirmed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, MockOutcome};

    fn flow() -> (Arc<MockBackend>, Arc<UserAlerts>, CameraFormFlow<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let alerts = Arc::new(UserAlerts::new(10));
        let flow = CameraFormFlow::new(backend.clone(), alerts.clone());
        (backend, alerts, flow)
    }

    fn gate_cam() -> CameraForm {
        CameraForm {
            name: "Gate Cam".to_string(),
            rtsp_url: "rtsp://x/y".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_placement_opens_and_drag_updates_location() {
        let (_, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;
        assert_eq!(flow.phase().await, FormPhase::Placing);

        flow.drag_to(GeoPoint::new(10.3, 36.9)).await;
        assert_eq!(flow.placement().await, Some(GeoPoint::new(10.3, 36.9)));
    }

    #[tokio::test]
    async fn test_empty_name_never_issues_a_request() {
        let (backend, alerts, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        let outcome = flow
            .submit(CameraForm {
                name: "   ".to_string(),
                rtsp_url: "rtsp://x/y".to_string(),
                description: None,
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(backend.created(), 0);
        assert_eq!(flow.phase().await, FormPhase::Placing);
        assert_eq!(alerts.latest(1).await[0].message, INCOMPLETE_DETAILS);
    }

    #[tokio::test]
    async fn test_empty_rtsp_url_never_issues_a_request() {
        let (backend, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        let outcome = flow
            .submit(CameraForm {
                name: "Gate Cam".to_string(),
                rtsp_url: String::new(),
                description: None,
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(backend.created(), 0);
    }

    #[tokio::test]
    async fn test_valid_submission_carries_exact_fields() {
        let (backend, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        let outcome = flow.submit(gate_cam()).await;
        let token = match outcome {
            SubmitOutcome::Submitted { token } => token,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert_eq!(backend.created(), 1);
        let request = backend.last_create.lock().unwrap().clone().unwrap();
        assert_eq!(request.name, "Gate Cam");
        assert_eq!(request.rtsp_url, "rtsp://x/y");
        assert_eq!(request.location, GeoPoint::new(10.2, 36.8));
        assert_eq!(request.client_token, token);

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded["location"],
            serde_json::json!({"type": "Point", "coordinates": [10.2, 36.8]})
        );

        assert_eq!(flow.phase().await, FormPhase::AwaitingConfirmation);
    }

    #[tokio::test]
    async fn test_dragged_marker_position_is_submitted() {
        let (backend, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;
        flow.drag_to(GeoPoint::new(10.5, 36.5)).await;
        flow.submit(gate_cam()).await;

        let request = backend.last_create.lock().unwrap().clone().unwrap();
        assert_eq!(request.location, GeoPoint::new(10.5, 36.5));
    }

    #[tokio::test]
    async fn test_confirmation_with_matching_token_closes_the_flow() {
        let (_, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;
        let token = match flow.submit(gate_cam()).await {
            SubmitOutcome::Submitted { token } => token,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert!(!flow.confirm(Some(Uuid::new_v4())).await);
        assert_eq!(flow.phase().await, FormPhase::AwaitingConfirmation);

        assert!(flow.confirm(Some(token)).await);
        assert_eq!(flow.phase().await, FormPhase::Idle);
    }

    #[tokio::test]
    async fn test_confirmation_without_token_closes_most_recent_pending() {
        let (_, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;
        flow.submit(gate_cam()).await;

        assert!(flow.confirm(None).await);
        assert_eq!(flow.phase().await, FormPhase::Idle);
        // Nothing pending anymore; a second confirmation is a no-op.
        assert!(!flow.confirm(None).await);
    }

    #[tokio::test]
    async fn test_backend_rejection_alerts_and_returns_to_idle() {
        let (backend, alerts, flow) = flow();
        backend.set_create_outcome(MockOutcome::Rejected("RTSP URL already used".to_string()));
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        assert_eq!(flow.submit(gate_cam()).await, SubmitOutcome::Failed);
        assert_eq!(flow.phase().await, FormPhase::Idle);
        assert!(alerts.latest(1).await[0]
            .message
            .contains("RTSP URL already used"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_alerts_and_returns_to_idle() {
        let (backend, alerts, flow) = flow();
        backend.set_create_outcome(MockOutcome::Unreachable);
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        assert_eq!(flow.submit(gate_cam()).await, SubmitOutcome::Failed);
        assert_eq!(flow.phase().await, FormPhase::Idle);
        assert_eq!(alerts.len().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_removes_the_transient_marker() {
        let (backend, _, flow) = flow();
        flow.begin_placement(GeoPoint::new(10.2, 36.8)).await;

        assert!(flow.cancel().await);
        assert_eq!(flow.phase().await, FormPhase::Idle);
        assert!(flow.placement().await.is_none());
        assert_eq!(backend.created(), 0);
    }

    #[tokio::test]
    async fn test_submit_without_placement_is_rejected() {
        let (backend, _, flow) = flow();
        assert_eq!(flow.submit(gate_cam()).await, SubmitOutcome::NotPlacing);
        assert_eq!(backend.created(), 0);
    }
}
