use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::base::{DaemonStatus, StatusProvider};
use crate::error::{ApiError, ApiResult};

/// Asks the local daemon for its status over JSON-RPC.
pub struct DaemonStatusProvider {
    url: String,
    client: reqwest::Client,
}

impl DaemonStatusProvider {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        info!("Creating daemon status provider for '{}'", url);
        DaemonStatusProvider {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StatusProvider for DaemonStatusProvider {
    async fn status(&self) -> ApiResult<DaemonStatus> {
        debug!("Requesting daemon status from '{}'", self.url);

        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "status",
            "params": {},
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ApiError::Status(format!("Failed to call daemon: {}", e)))?
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Status(format!("Failed to parse daemon JSON: {}", e)))?;

        if let Some(error) = resp.get("error").filter(|e| !e.is_null()) {
            let message = error["message"].as_str().unwrap_or("unknown daemon error");
            return Err(ApiError::Status(message.to_string()));
        }

        let result = resp
            .get("result")
            .cloned()
            .ok_or_else(|| ApiError::Status("Daemon response has no result".to_string()))?;
        serde_json::from_value(result)
            .map_err(|e| ApiError::Status(format!("Unexpected daemon status: {}", e)))
    }
}
