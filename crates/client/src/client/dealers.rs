//! Dealer API operations.

use super::LotlinkClient;
use crate::error::Result;
use lotlink_core::marketplace::{CreateDealerRequest, Dealer};
use uuid::Uuid;

impl LotlinkClient {
    /// List all dealers.
    pub async fn list_dealers(&self) -> Result<Vec<Dealer>> {
        let response = self.client.get(self.url("/api/dealers")).send().await?;
        self.handle_response(response).await
    }

    /// Register a dealer.
    pub async fn create_dealer(&self, req: CreateDealerRequest) -> Result<Dealer> {
        let response = self
            .client
            .post(self.url("/api/dealers"))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get dealer by ID.
    pub async fn get_dealer(&self, id: Uuid) -> Result<Dealer> {
        let response = self
            .client
            .get(self.url(&format!("/api/dealers/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }
}
