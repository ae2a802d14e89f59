//! The single consumer of the trigger queue

use pisight_core::{Error, FaultKind, Mode, ModeState};
use pisight_eye::{CameraManager, SnapshotWriter};
use pisight_rde::{DispatchOutcome, Dispatcher, NotificationEvent, Notifier};
use pisight_spk::{Feedback, FeedbackPlayer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::triggers::TriggerEvent;

/// What a successfully handled event did
#[derive(Debug, Clone)]
pub enum EventOutcome {
    ModeChanged(Mode),
    Dispatched(DispatchOutcome),
}

/// Counters since start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub events: u64,
    pub dispatches: u64,
    pub mode_changes: u64,
    pub faults: u64,
}

#[derive(Default)]
struct Counters {
    events: AtomicU64,
    dispatches: AtomicU64,
    mode_changes: AtomicU64,
    faults: AtomicU64,
}

/// Owns the mode and runs capture and dispatch one event at a time
pub struct CaptureWorker {
    mode: ModeState,
    camera: Arc<CameraManager>,
    dispatcher: Arc<Dispatcher>,
    notifier: Arc<Notifier>,
    feedback: Arc<FeedbackPlayer>,
    snapshots: Option<Arc<SnapshotWriter>>,
    ack_on_success: bool,
    counters: Counters,
}

impl CaptureWorker {
    pub fn new(
        camera: Arc<CameraManager>,
        dispatcher: Arc<Dispatcher>,
        notifier: Arc<Notifier>,
        feedback: Arc<FeedbackPlayer>,
    ) -> Self {
        Self {
            mode: ModeState::default(),
            camera,
            dispatcher,
            notifier,
            feedback,
            snapshots: None,
            ack_on_success: false,
            counters: Counters::default(),
        }
    }

    pub fn with_snapshots(mut self, snapshots: Arc<SnapshotWriter>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_ack_on_success(mut self, ack: bool) -> Self {
        self.ack_on_success = ack;
        self
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        Self {
            mode: ModeState::new(mode),
            ..self
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.current()
    }

    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            events: self.counters.events.load(Ordering::Relaxed),
            dispatches: self.counters.dispatches.load(Ordering::Relaxed),
            mode_changes: self.counters.mode_changes.load(Ordering::Relaxed),
            faults: self.counters.faults.load(Ordering::Relaxed),
        }
    }

    /// Drain the queue until every sender is gone
    pub async fn run(&self, rx: mpsc::Receiver<TriggerEvent>) -> WorkerStats {
        let (_keep_running, shutdown) = watch::channel(false);
        self.run_until(rx, shutdown).await
    }

    /// Handle events until every sender is gone or `shutdown` turns true.
    ///
    /// The flag is checked between events: the event in progress finishes,
    /// anything still queued is dropped.
    pub async fn run_until(
        &self,
        mut rx: mpsc::Receiver<TriggerEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> WorkerStats {
        info!("Worker started in {} mode", self.mode());
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // flag sender gone without raising it, drain like `run`
                        while let Some(event) = rx.recv().await {
                            self.handle(event).await;
                        }
                        break;
                    }
                }
                event = rx.recv() => match event {
                    Some(event) => {
                        self.handle(event).await;
                    }
                    None => break,
                },
            }
        }

        rx.close();
        let mut dropped = 0usize;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            info!("Dropped {} queued event(s) on shutdown", dropped);
        }

        let stats = self.stats();
        info!(
            "Worker stopped: {} events, {} dispatches, {} mode changes, {} faults",
            stats.events, stats.dispatches, stats.mode_changes, stats.faults
        );
        stats
    }

    /// Handle one event. A failure plays exactly one fault pattern and is
    /// returned as its kind; it never stops the worker.
    pub async fn handle(&self, event: TriggerEvent) -> Option<FaultKind> {
        self.counters.events.fetch_add(1, Ordering::Relaxed);

        let err = match self.process(event).await {
            Ok(EventOutcome::ModeChanged(_)) => return None,
            Ok(EventOutcome::Dispatched(outcome)) => {
                info!(
                    "{} frame accepted by {} (HTTP {}, {} attempt(s), {:?})",
                    outcome.mode, outcome.route, outcome.status, outcome.attempts, outcome.elapsed
                );
                if self.ack_on_success {
                    self.feedback.play(Feedback::Ack).await;
                }
                return None;
            }
            Err(err) => err,
        };

        // anything without a fault kind still happened on the device
        let kind = err.kind().unwrap_or(FaultKind::HardwareFault);
        self.counters.faults.fetch_add(1, Ordering::Relaxed);
        error!("{:?} failed ({}): {}", event, kind, err);

        self.feedback.play(Feedback::Fault(kind)).await;
        self.notifier.notify(NotificationEvent::Fault(kind)).await;
        Some(kind)
    }

    /// Handle one event, returning its outcome or the error that stopped it
    pub async fn process(&self, event: TriggerEvent) -> Result<EventOutcome, Error> {
        match event {
            TriggerEvent::AdvanceMode => {
                let mode = self.mode.advance_mode();
                self.counters.mode_changes.fetch_add(1, Ordering::Relaxed);
                info!("Mode changed to {}", mode);
                self.notifier.notify(NotificationEvent::ModeChanged(mode)).await;
                Ok(EventOutcome::ModeChanged(mode))
            }
            TriggerEvent::Capture => {
                let mode = self.mode.current();
                let outcome = self.capture_and_dispatch(mode).await?;
                self.counters.dispatches.fetch_add(1, Ordering::Relaxed);
                Ok(EventOutcome::Dispatched(outcome))
            }
        }
    }

    async fn capture_and_dispatch(&self, mode: Mode) -> Result<DispatchOutcome, Error> {
        let image = self.camera.capture().await?;
        debug!("Captured {}x{} for {} mode", image.width(), image.height(), mode);

        let request = self.dispatcher.prepare(&image, mode)?;

        if let Some(snapshots) = &self.snapshots {
            if let Err(e) = snapshots.write(image.captured_at(), request.jpeg()).await {
                warn!("Failed to keep snapshot: {}", e);
            }
        }

        Ok(self.dispatcher.send(&request).await?)
    }
}
