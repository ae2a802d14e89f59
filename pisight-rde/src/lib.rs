//! pisight-rde: remote dispatch for pisight
//!
//! Turns a captured frame into exactly one analysis request for the backend
//! selected by the current mode, relays mode changes and faults to the
//! companion app through the backend's socket relay, and can call the Cloud
//! Vision annotate API directly for bench testing.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod notifier;
pub mod request;
pub mod strategy;
pub mod vision_api;

pub use client::RemoteClient;
pub use config::{RemoteConfig, RetryConfig, VisionApiConfig};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::DispatchError;
pub use notifier::{NotificationEvent, Notifier};
pub use request::AnalysisRequest;
pub use strategy::{AnalysisOperation, BodyEncoding, StrategyTable, TextDetectionType};
pub use vision_api::{TextAnnotation, VisionApiClient};
