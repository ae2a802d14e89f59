use crate::strategy::{AnalysisOperation, BodyEncoding};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use pisight_core::Mode;

/// One outbound analysis call: JPEG payload plus the operation chosen for the mode
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    mode: Mode,
    operation: AnalysisOperation,
    jpeg: Bytes,
}

impl AnalysisRequest {
    pub fn new(mode: Mode, operation: AnalysisOperation, jpeg: impl Into<Bytes>) -> Self {
        Self {
            mode,
            operation,
            jpeg: jpeg.into(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn operation(&self) -> &AnalysisOperation {
        &self.operation
    }

    pub fn jpeg(&self) -> &Bytes {
        &self.jpeg
    }

    pub fn route(&self) -> &'static str {
        self.operation.route()
    }

    /// Request body in the operation's encoding
    pub fn body(&self) -> Bytes {
        match self.operation.body_encoding() {
            BodyEncoding::Base64 => Bytes::from(STANDARD.encode(&self.jpeg)),
            BodyEncoding::Raw => self.jpeg.clone(),
        }
    }
}
