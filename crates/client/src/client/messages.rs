//! Chat message API operations.

use super::LotlinkClient;
use crate::error::Result;
use lotlink_core::marketplace::{MarkReadRequest, Message, SendMessageRequest};
use lotlink_core::storage::{CountResponse, MessageQuery};
use uuid::Uuid;

impl LotlinkClient {
    /// List a delivery's conversation, oldest first.
    pub async fn list_messages(&self, delivery_id: Uuid) -> Result<Vec<Message>> {
        let response = self
            .client
            .get(self.url(&format!("/api/deliveries/{}/messages", delivery_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Send a message on a delivery.
    pub async fn send_message(&self, delivery_id: Uuid, req: SendMessageRequest) -> Result<Message> {
        let response = self
            .client
            .post(self.url(&format!("/api/deliveries/{}/messages", delivery_id)))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get message by ID.
    pub async fn get_message(&self, id: Uuid) -> Result<Message> {
        let response = self
            .client
            .get(self.url(&format!("/api/messages/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Mark one message read.
    pub async fn mark_message_read(&self, id: Uuid) -> Result<Message> {
        let response = self
            .client
            .post(self.url(&format!("/api/messages/{}/read", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Mark every unread message addressed to `recipient_id` read.
    /// Returns how many messages changed.
    pub async fn mark_conversation_read(&self, delivery_id: Uuid, recipient_id: Uuid) -> Result<u64> {
        let response = self
            .client
            .post(self.url(&format!("/api/deliveries/{}/messages/read", delivery_id)))
            .form(&MarkReadRequest { recipient_id })
            .send()
            .await?;
        let body: CountResponse = self.handle_response(response).await?;
        Ok(body.count)
    }

    /// Counted read over messages.
    pub async fn count_messages(&self, query: &MessageQuery) -> Result<u64> {
        let response = self
            .client
            .get(self.url("/api/messages/count"))
            .query(query)
            .send()
            .await?;
        let body: CountResponse = self.handle_response(response).await?;
        Ok(body.count)
    }
}
