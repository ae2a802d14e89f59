//! HTTP client for the analysis backend

use crate::config::{RemoteConfig, RetryConfig};
use crate::error::DispatchError;
use crate::request::AnalysisRequest;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Reply to a successful POST
#[derive(Debug, Clone)]
pub struct RemoteReply {
    pub status: u16,
    pub attempts: u32,
    pub elapsed: Duration,
    pub body: String,
}

/// Backend client with a fixed timeout and a bounded retry
pub struct RemoteClient {
    client: Client,
    base_url: String,
    results_path: String,
    retry: RetryConfig,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DispatchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            results_path: config.results_path.clone(),
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// POST an analysis request; only HTTP 200 counts as success.
    ///
    /// Network faults and 5xx replies are retried at most once.
    pub async fn submit(&self, request: &AnalysisRequest) -> Result<RemoteReply, DispatchError> {
        let route = request.route();
        let mut query = request.operation().query();
        query.push(("socket_emit_path", self.results_path.clone()));
        let body = request.body();

        let retries = self.retry.bounded_retries();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post(route, &query, body.clone(), "image/jpeg").await {
                Ok(mut reply) => {
                    reply.attempts = attempt;
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() && attempt <= retries => {
                    warn!(
                        "{} failed ({}), retrying in {}ms",
                        route, e, self.retry.retry_delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(self.retry.retry_delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Push a plain-text message to a socket path through the relay. Single attempt.
    pub async fn emit(&self, path: &str, message: &str) -> Result<(), DispatchError> {
        let query = [("path", path.to_string())];
        self.post("/socket_emit", &query, Bytes::from(message.to_string()), "text/plain")
            .await
            .map(|_| ())
    }

    async fn post(
        &self,
        route: &str,
        query: &[(&str, String)],
        body: Bytes,
        content_type: &str,
    ) -> Result<RemoteReply, DispatchError> {
        let url = self.endpoint(route);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .query(query)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| DispatchError::Network {
                endpoint: route.to_string(),
                message: if e.is_timeout() {
                    format!("timed out: {}", e)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DispatchError::BadResponse {
                endpoint: route.to_string(),
                status: status.as_u16(),
            });
        }

        // the 200 already counts; an unreadable reply body is only logged
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("{} -> {} but the reply body could not be read: {}", route, status, e);
                String::new()
            }
        };
        let elapsed = start.elapsed();
        debug!(
            "{} -> {} in {:?} ({} bytes): {}",
            route,
            status,
            elapsed,
            body.len(),
            body.chars().take(200).collect::<String>()
        );

        Ok(RemoteReply {
            status: status.as_u16(),
            attempts: 1,
            elapsed,
            body,
        })
    }
}
