//! Companion app notifications through the socket relay

use crate::client::RemoteClient;
use pisight_core::{FaultKind, Mode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Short message for the companion display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    ModeChanged(Mode),
    Fault(FaultKind),
}

impl NotificationEvent {
    pub fn message(&self) -> String {
        match self {
            NotificationEvent::ModeChanged(mode) => mode.as_str().to_string(),
            NotificationEvent::Fault(kind) => format!("ERROR: {}", kind),
        }
    }
}

pub struct Notifier {
    client: Arc<RemoteClient>,
    info_path: String,
    notify_faults: bool,
    delivered: AtomicU64,
}

impl Notifier {
    pub fn new(client: Arc<RemoteClient>, info_path: impl Into<String>, notify_faults: bool) -> Self {
        Self {
            client,
            info_path: info_path.into(),
            notify_faults,
            delivered: AtomicU64::new(0),
        }
    }

    /// Fire-and-forget: returns whether the relay accepted the message
    pub async fn notify(&self, event: NotificationEvent) -> bool {
        if matches!(event, NotificationEvent::Fault(_)) && !self.notify_faults {
            return false;
        }

        let message = event.message();
        match self.client.emit(&self.info_path, &message).await {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                debug!("Notified companion: {}", message);
                true
            }
            Err(e) => {
                warn!("Failed to notify companion ({}): {}", message, e);
                false
            }
        }
    }

    /// Send arbitrary text to a socket path
    pub async fn send_text(&self, path: &str, message: &str) -> bool {
        match self.client.emit(path, message).await {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                warn!("Failed to emit to {}: {}", path, e);
                false
            }
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}
