//! Fetching specification and declaration documents.
//!
//! The normalizer never talks to the network directly; it is handed a
//! [`SpecFetcher`] so Swagger 1.2 declaration lookups can be served from
//! canned documents.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait SpecFetcher: Send + Sync {
    /// Fetch `url` and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Fetches documents over HTTP with a bounded timeout. No retries, no caching.
#[derive(Clone)]
pub struct HttpSpecFetcher {
    http: reqwest::Client,
}

impl HttpSpecFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ResourceError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl SpecFetcher for HttpSpecFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::FetchError(format!("{}: timed out", url))
                } else {
                    AppError::FetchError(format!("{}: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!(
                "{}: HTTP {}",
                url,
                status.as_u16()
            )));
        }

        let document = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::FetchError(format!("{}: body is not JSON ({})", url, e)))?;

        tracing::debug!(url, "Fetched specification document");
        Ok(document)
    }
}

/// Serves documents from memory, keyed by exact URL.
#[derive(Debug, Clone, Default)]
pub struct StaticSpecFetcher {
    documents: HashMap<String, Value>,
}

impl StaticSpecFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }
}

#[async_trait]
impl SpecFetcher for StaticSpecFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::FetchError(format!("{}: HTTP 404", url)))
    }
}
