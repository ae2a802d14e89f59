//! Wiring from configuration to a running capture loop

use crate::config::AppConfig;
use crate::triggers::{spawn_keyboard_source, trigger_channel};
use crate::worker::{CaptureWorker, WorkerStats};
use pisight_core::Error;
use pisight_eye::{CameraManager, SnapshotWriter};
use pisight_rde::{Dispatcher, Notifier};
use pisight_spk::{driver_from_config, FeedbackPlayer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything the worker needs, built once per run
pub struct Services {
    pub camera: Arc<CameraManager>,
    pub dispatcher: Arc<Dispatcher>,
    pub notifier: Arc<Notifier>,
    pub feedback: Arc<FeedbackPlayer>,
    pub snapshots: Option<Arc<SnapshotWriter>>,
}

impl Services {
    /// Validate the configuration and open every device and client
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        config.validate()?;

        let camera = Arc::new(CameraManager::new(Arc::new(config.camera.clone()))?);
        let dispatcher = Arc::new(Dispatcher::from_config(&config.remote, config.camera.jpeg_quality)?);
        let notifier = Arc::new(Notifier::new(
            Arc::clone(dispatcher.client()),
            config.remote.info_path.clone(),
            config.remote.notify_faults,
        ));

        let driver = driver_from_config(&config.feedback)?;
        let feedback = Arc::new(FeedbackPlayer::new(Arc::new(config.feedback.clone()), driver));

        let snapshots = match &config.camera.snapshot_dir {
            Some(dir) => {
                let writer = SnapshotWriter::open(
                    dir.clone(),
                    config.camera.snapshot_naming,
                    config.camera.clear_snapshots_on_start,
                )?;
                info!("Keeping snapshots in {}", writer.dir().display());
                Some(Arc::new(writer))
            }
            None => None,
        };

        info!(
            "Services ready: camera={}, buzzer={}, backend={}",
            camera.backend_name(),
            feedback.driver_name(),
            dispatcher.client().base_url()
        );

        Ok(Self {
            camera,
            dispatcher,
            notifier,
            feedback,
            snapshots,
        })
    }

    pub fn worker(&self, config: &AppConfig) -> CaptureWorker {
        let worker = CaptureWorker::new(
            Arc::clone(&self.camera),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.notifier),
            Arc::clone(&self.feedback),
        )
        .with_ack_on_success(config.triggers.ack_on_success);

        match &self.snapshots {
            Some(snapshots) => worker.with_snapshots(Arc::clone(snapshots)),
            None => worker,
        }
    }
}

/// Run the capture loop until Ctrl-C or `q` on the keyboard
pub async fn run(config: AppConfig, keyboard: bool) -> Result<WorkerStats, Error> {
    let services = Services::from_config(&config)?;
    let worker = Arc::new(services.worker(&config));

    let (sender, rx) = trigger_channel(
        config.triggers.queue_size,
        Duration::from_millis(config.triggers.debounce_ms),
    );

    #[cfg(feature = "rpi")]
    let buttons = Some(crate::buttons::GpioButtons::new(&config.triggers, sender.clone())?);
    #[cfg(not(feature = "rpi"))]
    let buttons: Option<()> = None;

    let use_keyboard = keyboard || buttons.is_none();
    if !keyboard && use_keyboard {
        warn!("Built without the `rpi` feature, reading triggers from the keyboard");
    }
    let keyboard_task = use_keyboard.then(|| spawn_keyboard_source(sender.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run_until(rx, shutdown_rx).await })
    };

    let stopped = wait_for_stop(signal::ctrl_c(), keyboard_task).await;

    // the worker finishes the current event and drops the rest
    shutdown_tx.send_replace(true);
    drop(buttons);
    drop(sender);

    let stats = worker_task
        .await
        .map_err(|e| Error::Hardware(format!("Worker task failed: {}", e)))?;
    stopped.map(|()| stats)
}

/// Wait for an interrupt, or for the keyboard source to quit when there is one
async fn wait_for_stop<F>(interrupt: F, keyboard: Option<JoinHandle<()>>) -> Result<(), Error>
where
    F: Future<Output = std::io::Result<()>>,
{
    match keyboard {
        Some(mut task) => {
            tokio::select! {
                interrupted = interrupt => match interrupted {
                    Ok(()) => {
                        info!("Interrupted");
                        task.abort();
                    }
                    Err(e) => {
                        warn!("Failed to listen for Ctrl-C, waiting for `q`: {}", e);
                        let _ = task.await;
                    }
                },
                _ = &mut task => {}
            }
            Ok(())
        }
        None => {
            interrupt
                .await
                .map_err(|e| Error::Hardware(format!("Failed to listen for Ctrl-C: {}", e)))?;
            info!("Interrupted");
            Ok(())
        }
    }
}
