//! Dispatch of captured frames by mode

use crate::client::RemoteClient;
use crate::config::RemoteConfig;
use crate::error::DispatchError;
use crate::request::AnalysisRequest;
use crate::strategy::StrategyTable;
use pisight_core::Mode;
use pisight_eye::CapturedImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Result of one successful dispatch
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub mode: Mode,
    pub route: &'static str,
    pub status: u16,
    pub attempts: u32,
    pub elapsed: Duration,
    pub payload_bytes: usize,
}

pub struct Dispatcher {
    client: Arc<RemoteClient>,
    table: StrategyTable,
    jpeg_quality: u8,
}

impl Dispatcher {
    pub fn new(client: Arc<RemoteClient>, table: StrategyTable, jpeg_quality: u8) -> Self {
        Self {
            client,
            table,
            jpeg_quality,
        }
    }

    pub fn from_config(config: &RemoteConfig, jpeg_quality: u8) -> Result<Self, DispatchError> {
        let client = Arc::new(RemoteClient::new(config)?);
        Ok(Self::new(client, StrategyTable::from_config(config), jpeg_quality))
    }

    pub fn client(&self) -> &Arc<RemoteClient> {
        &self.client
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Encode the frame and pair it with the operation for `mode`
    pub fn prepare(&self, image: &CapturedImage, mode: Mode) -> Result<AnalysisRequest, DispatchError> {
        let jpeg = image.to_jpeg(self.jpeg_quality)?;
        Ok(AnalysisRequest::new(mode, self.table.operation(mode).clone(), jpeg))
    }

    /// Send a prepared request
    pub async fn send(&self, request: &AnalysisRequest) -> Result<DispatchOutcome, DispatchError> {
        info!(
            "Dispatching {} frame ({} bytes) to {}",
            request.mode(),
            request.jpeg().len(),
            request.route()
        );
        let reply = self.client.submit(request).await?;
        Ok(DispatchOutcome {
            mode: request.mode(),
            route: request.route(),
            status: reply.status,
            attempts: reply.attempts,
            elapsed: reply.elapsed,
            payload_bytes: request.jpeg().len(),
        })
    }

    /// Encode `image` and send it to the operation selected by `mode`
    pub async fn dispatch(&self, image: &CapturedImage, mode: Mode) -> Result<DispatchOutcome, DispatchError> {
        let request = self.prepare(image, mode)?;
        self.send(&request).await
    }
}
