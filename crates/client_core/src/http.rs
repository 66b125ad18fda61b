//! Single-shot JSON GET against the analytics API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;

/// Message used when an error response carries no body.
pub const REQUEST_FAILED: &str = "Request failed";

/// Base URL prepended to root-relative paths. An empty base leaves paths
/// root-relative, for deployments served next to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        Self(raw.strip_suffix('/').unwrap_or(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.0, path)
        }
    }
}

#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Returns the parsed body; the shape is the caller's concern.
    async fn get_json(&self, path: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T> JsonFetcher for Arc<T>
where
    T: JsonFetcher + ?Sized,
{
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        (**self).get_json(path).await
    }
}

pub struct HttpFetcher {
    http: Client,
    base: ApiBase,
}

impl HttpFetcher {
    pub fn new(base: ApiBase) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.base.resolve(path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "api request failed");
            let message = if body.is_empty() {
                REQUEST_FAILED.to_string()
            } else {
                body
            };
            return Err(FetchError::Request {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|err| FetchError::Parse {
            url,
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
