//! Delivery API operations.

use super::LotlinkClient;
use crate::error::Result;
use lotlink_core::marketplace::{
    AcceptDeliveryRequest, CreateDeliveryRequest, Delivery, DeliveryStatus, ListDeliveriesQuery,
    UpdateDeliveryRequest, UpdateStatusRequest,
};
use uuid::Uuid;

impl LotlinkClient {
    /// List deliveries matching the query.
    pub async fn list_deliveries(&self, query: &ListDeliveriesQuery) -> Result<Vec<Delivery>> {
        let response = self
            .client
            .get(self.url("/api/deliveries"))
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Request a delivery or swap.
    pub async fn create_delivery(&self, req: CreateDeliveryRequest) -> Result<Delivery> {
        let response = self
            .client
            .post(self.url("/api/deliveries"))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get delivery by ID.
    pub async fn get_delivery(&self, id: Uuid) -> Result<Delivery> {
        let response = self
            .client
            .get(self.url(&format!("/api/deliveries/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Edit addresses or notes of an open delivery.
    pub async fn update_delivery(&self, id: Uuid, req: UpdateDeliveryRequest) -> Result<Delivery> {
        let response = self
            .client
            .put(self.url(&format!("/api/deliveries/{}", id)))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Accept a requested delivery as `driver_id`.
    pub async fn accept_delivery(&self, id: Uuid, driver_id: Uuid) -> Result<Delivery> {
        let response = self
            .client
            .post(self.url(&format!("/api/deliveries/{}/accept", id)))
            .form(&AcceptDeliveryRequest { driver_id })
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Move a delivery to its next status.
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
    ) -> Result<Delivery> {
        let response = self
            .client
            .post(self.url(&format!("/api/deliveries/{}/status", id)))
            .form(&UpdateStatusRequest { status })
            .send()
            .await?;
        self.handle_response(response).await
    }
}
