//! Direct Cloud Vision `images:annotate` calls

use crate::config::VisionApiConfig;
use crate::error::DispatchError;
use crate::strategy::TextDetectionType;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "GOOGLE_VISION_API_KEY";

/// First text annotation of an image plus the round-trip time
#[derive(Debug, Clone)]
pub struct TextAnnotation {
    pub text: Option<String>,
    pub locale: Option<String>,
    pub elapsed: Duration,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
    locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

pub struct VisionApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    max_results: u32,
}

impl VisionApiClient {
    /// Build a client; the key comes from config or `GOOGLE_VISION_API_KEY`.
    pub fn new(config: &VisionApiConfig) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::Config)?;

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                DispatchError::Config(format!("Vision API key not provided (set {})", API_KEY_ENV))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DispatchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            max_results: config.max_results,
        })
    }

    /// Run text detection on a JPEG
    pub async fn annotate(
        &self,
        jpeg: &[u8],
        kind: TextDetectionType,
    ) -> Result<TextAnnotation, DispatchError> {
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(jpeg) },
                "features": [{ "type": kind.as_str(), "maxResults": self.max_results }],
            }]
        });

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Network {
                endpoint: "images:annotate".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DispatchError::BadResponse {
                endpoint: "images:annotate".to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::InvalidResponse(format!("annotate reply: {}", e)))?;
        let elapsed = start.elapsed();
        info!("Inference time: {:.2} sec", elapsed.as_secs_f64());

        let first = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::InvalidResponse("annotate reply has no responses".to_string()))?;

        if let Some(err) = first.error {
            return Err(DispatchError::InvalidResponse(format!(
                "Vision API error {}: {}",
                err.code, err.message
            )));
        }

        let annotation = first.text_annotations.into_iter().next();
        debug!("Annotation: {:?}", annotation);
        Ok(TextAnnotation {
            text: annotation.as_ref().and_then(|a| a.description.clone()),
            locale: annotation.and_then(|a| a.locale),
            elapsed,
        })
    }
}
