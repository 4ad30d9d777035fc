//! HTTP client for the lotlink API.

pub mod dealers;
pub mod deliveries;
pub mod drivers;
pub mod events;
pub mod health;
pub mod messages;
pub mod sales_users;

use crate::error::{ClientError, Result};

/// HTTP client for the lotlink API.
#[derive(Debug, Clone)]
pub struct LotlinkClient {
    client: reqwest::Client,
    base_url: String,
}

impl LotlinkClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment (LOTLINK_URL or default).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("LOTLINK_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Handle error responses.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(ClientError::from)
        } else if status.as_u16() == 404 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Resource".to_string());
            Err(ClientError::NotFound { resource: message })
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = LotlinkClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/api/dealers"),
            "http://localhost:3000/api/dealers"
        );
    }
}
