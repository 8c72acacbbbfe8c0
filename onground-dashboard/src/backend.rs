//! HTTP implementation of [`DashboardBackend`]

use anyhow::{Context, Result};
use onground_sdk::{
    async_trait, AgentRequest, AgentResponse, BackendError, BackendResult, DashboardBackend,
    DashboardData, ToolsResponse,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode(response).await
    }
}

/// Decode a body regardless of status. Error payloads from the backend
/// usually still carry `success: false` and an `error` string.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => Err(BackendError::Decode(e.to_string())),
        Err(_) => {
            tracing::warn!(status = status.as_u16(), "backend returned a non-JSON error body");
            Err(BackendError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn fetch_data(&self) -> BackendResult<DashboardData> {
        self.get_json("api/data").await
    }

    async fn fetch_tools(&self) -> BackendResult<ToolsResponse> {
        self.get_json("api/tools").await
    }

    async fn run_agent(&self, message: &str) -> BackendResult<AgentResponse> {
        let url = self.endpoint("run_agent");
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(&AgentRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.endpoint("/api/data"), "http://localhost:8000/api/data");
        assert_eq!(backend.endpoint("run_agent"), "http://localhost:8000/run_agent");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = backend.fetch_data().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
