//! Health check operations.

use super::LotlinkClient;
use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};

/// Server health and event history stats.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub event_history_size: usize,
    pub oldest_event_id: u64,
    pub active_listeners: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LotlinkClient {
    /// Liveness probe. Succeeds if the server accepts connections.
    pub async fn livez(&self) -> Result<()> {
        let response = self.client.get(self.url("/livez")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: "liveness probe failed".to_string(),
            })
        }
    }

    /// Storage check and event stats. An unhealthy server still returns its status.
    pub async fn healthz(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.url("/healthz")).send().await?;
        if response.status().as_u16() == 503 {
            return response.json().await.map_err(ClientError::from);
        }
        self.handle_response(response).await
    }
}
