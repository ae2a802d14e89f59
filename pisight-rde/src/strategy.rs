//! Mode to remote operation lookup

use crate::config::RemoteConfig;
use pisight_core::Mode;
use serde::{Deserialize, Serialize};

/// OCR feature requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextDetectionType {
    TextDetection,
    DocumentTextDetection,
}

impl TextDetectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDetectionType::TextDetection => "TEXT_DETECTION",
            TextDetectionType::DocumentTextDetection => "DOCUMENT_TEXT_DETECTION",
        }
    }
}

/// How the JPEG travels in the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Base64,
    Raw,
}

/// One remote analysis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOperation {
    TextDetection(TextDetectionType),
    ColorClusters { k: u32 },
    MoneyClassification,
}

impl AnalysisOperation {
    pub fn route(&self) -> &'static str {
        match self {
            AnalysisOperation::TextDetection(_) => "/ocr",
            AnalysisOperation::ColorClusters { .. } => "/detect_color",
            AnalysisOperation::MoneyClassification => "/classify_money",
        }
    }

    /// Operation-specific query parameters (the callback path is added by the client)
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            AnalysisOperation::TextDetection(kind) => vec![("type", kind.as_str().to_string())],
            AnalysisOperation::ColorClusters { k } => vec![("k", k.to_string())],
            AnalysisOperation::MoneyClassification => Vec::new(),
        }
    }

    pub fn body_encoding(&self) -> BodyEncoding {
        match self {
            AnalysisOperation::TextDetection(_) => BodyEncoding::Base64,
            _ => BodyEncoding::Raw,
        }
    }
}

/// Which operation each mode runs. Indexed by [`Mode::index`].
#[derive(Debug, Clone)]
pub struct StrategyTable {
    operations: [AnalysisOperation; 4],
}

impl StrategyTable {
    pub fn new(color_clusters: u32) -> Self {
        Self {
            operations: [
                AnalysisOperation::TextDetection(TextDetectionType::TextDetection),
                AnalysisOperation::TextDetection(TextDetectionType::DocumentTextDetection),
                AnalysisOperation::ColorClusters { k: color_clusters },
                AnalysisOperation::MoneyClassification,
            ],
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.color_clusters)
    }

    pub fn operation(&self, mode: Mode) -> &AnalysisOperation {
        &self.operations[mode.index()]
    }

    /// Replace the operation for one mode
    pub fn with_operation(mut self, mode: Mode, operation: AnalysisOperation) -> Self {
        self.operations[mode.index()] = operation;
        self
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::new(3)
    }
}
