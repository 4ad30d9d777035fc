//! Sales user API operations.

use super::LotlinkClient;
use crate::error::Result;
use lotlink_core::marketplace::{CreateSalesUserRequest, SalesUser};
use uuid::Uuid;

impl LotlinkClient {
    /// List sales users, optionally only those of one dealer.
    pub async fn list_sales_users(&self, dealer_id: Option<Uuid>) -> Result<Vec<SalesUser>> {
        let mut request = self.client.get(self.url("/api/sales-users"));
        if let Some(dealer_id) = dealer_id {
            request = request.query(&[("dealer_id", dealer_id)]);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Add a sales user to a dealer.
    pub async fn create_sales_user(&self, req: CreateSalesUserRequest) -> Result<SalesUser> {
        let response = self
            .client
            .post(self.url("/api/sales-users"))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get sales user by ID.
    pub async fn get_sales_user(&self, id: Uuid) -> Result<SalesUser> {
        let response = self
            .client
            .get(self.url(&format!("/api/sales-users/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }
}
