//! UserAlerts - user-facing alert recording (ring buffer)
//!
//! Collects the messages the UI surfaces to the user (failed saves,
//! unreachable backend, dead streams). Capacity-bounded; old alerts fall
//! off the front.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// A single user-facing alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: u64,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

struct AlertRingBuffer {
    alerts: VecDeque<Alert>,
    capacity: usize,
    next_id: u64,
}

impl AlertRingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    fn push(&mut self, message: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.alerts.len() >= self.capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(Alert {
            alert_id: id,
            message,
            raised_at: Utc::now(),
        });
        id
    }
}

/// UserAlerts instance
pub struct UserAlerts {
    buffer: RwLock<AlertRingBuffer>,
}

impl UserAlerts {
    /// Create with the given retained-alert capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RwLock::new(AlertRingBuffer::new(capacity)),
        }
    }

    /// Record an alert
    pub async fn raise(&self, message: impl Into<String>) -> u64 {
        let message = message.into();
        tracing::warn!(message = %message, "User alert raised");
        self.buffer.write().await.push(message)
    }

    /// Latest alerts, newest first
    pub async fn latest(&self, count: usize) -> Vec<Alert> {
        let buffer = self.buffer.read().await;
        buffer.alerts.iter().rev().take(count).cloned().collect()
    }

    /// Number of retained alerts
    pub async fn len(&self) -> usize {
        self.buffer.read().await.alerts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for UserAlerts {
    fn default() -> Self {
        Self::new(crate::state::DEFAULT_ALERT_CAPACITY)
    }
}
