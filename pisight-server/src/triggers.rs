//! Trigger events, software debounce and the keyboard trigger source

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a button press asks the worker to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    Capture,
    AdvanceMode,
}

impl TriggerEvent {
    fn slot(self) -> usize {
        match self {
            TriggerEvent::Capture => 0,
            TriggerEvent::AdvanceMode => 1,
        }
    }
}

/// Drops a second event of the same kind inside the window
pub struct Debouncer {
    window: Duration,
    last_accepted: Mutex<[Option<Instant>; 2]>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: Mutex::new([None, None]),
        }
    }

    /// Accept `event` seen at `now`, recording it when accepted
    pub fn accept_at(&self, event: TriggerEvent, now: Instant) -> bool {
        self.accept_with(event, now, || true)
    }

    /// Accept `event` only if it is outside the window and `deliver` succeeds.
    /// The window starts from the last delivered event of that kind.
    pub fn accept_with<F>(&self, event: TriggerEvent, now: Instant, deliver: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let mut last = self.last_accepted.lock();
        let slot = &mut last[event.slot()];
        if let Some(previous) = *slot {
            if now.saturating_duration_since(previous) < self.window {
                return false;
            }
        }
        if !deliver() {
            return false;
        }
        *slot = Some(now);
        true
    }
}

/// Producer side of the trigger queue.
///
/// Never blocks, so it is safe to call from GPIO interrupt threads.
#[derive(Clone)]
pub struct TriggerSender {
    tx: mpsc::Sender<TriggerEvent>,
    debouncer: Arc<Debouncer>,
}

impl TriggerSender {
    /// Returns whether the event was queued
    pub fn send(&self, event: TriggerEvent) -> bool {
        let mut debounced = true;
        let queued = self.debouncer.accept_with(event, Instant::now(), || {
            debounced = false;
            match self.tx.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(event)) => {
                    warn!("Trigger queue full, dropping {:?}", event);
                    false
                }
                Err(TrySendError::Closed(event)) => {
                    debug!("Trigger queue closed, dropping {:?}", event);
                    false
                }
            }
        });
        if debounced {
            debug!("Debounced {:?}", event);
        }
        queued
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Bounded trigger queue with a shared debouncer
pub fn trigger_channel(
    queue_size: usize,
    debounce: Duration,
) -> (TriggerSender, mpsc::Receiver<TriggerEvent>) {
    let (tx, rx) = mpsc::channel(queue_size.max(1));
    let sender = TriggerSender {
        tx,
        debouncer: Arc::new(Debouncer::new(debounce)),
    };
    (sender, rx)
}

/// A line typed on the keyboard source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardCommand {
    Trigger(TriggerEvent),
    Quit,
}

pub fn parse_command(line: &str) -> Option<KeyboardCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "c" | "capture" => Some(KeyboardCommand::Trigger(TriggerEvent::Capture)),
        "m" | "mode" => Some(KeyboardCommand::Trigger(TriggerEvent::AdvanceMode)),
        "q" | "quit" => Some(KeyboardCommand::Quit),
        _ => None,
    }
}

/// Read trigger commands from stdin until `q` or end of input
pub fn spawn_keyboard_source(sender: TriggerSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Keyboard triggers: c = capture, m = mode, q = quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(KeyboardCommand::Trigger(event)) => {
                        sender.send(event);
                    }
                    Some(KeyboardCommand::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown command: {}", line.trim()),
                },
                Ok(None) => {
                    debug!("Keyboard input closed");
                    break;
                }
                Err(e) => {
                    warn!("Failed to read keyboard input: {}", e);
                    break;
                }
            }
        }
    })
}
