//! Driver API operations.

use super::LotlinkClient;
use crate::error::Result;
use lotlink_core::marketplace::{CreateDriverRequest, Driver, UpdateDriverRequest};
use uuid::Uuid;

impl LotlinkClient {
    /// List drivers. With `available_only`, only drivers taking jobs.
    pub async fn list_drivers(&self, available_only: bool) -> Result<Vec<Driver>> {
        let mut request = self.client.get(self.url("/api/drivers"));
        if available_only {
            request = request.query(&[("available", "true")]);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Register a driver.
    pub async fn create_driver(&self, req: CreateDriverRequest) -> Result<Driver> {
        let response = self
            .client
            .post(self.url("/api/drivers"))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Get driver by ID.
    pub async fn get_driver(&self, id: Uuid) -> Result<Driver> {
        let response = self
            .client
            .get(self.url(&format!("/api/drivers/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Update a driver's phone or availability.
    pub async fn update_driver(&self, id: Uuid, req: UpdateDriverRequest) -> Result<Driver> {
        let response = self
            .client
            .patch(self.url(&format!("/api/drivers/{}", id)))
            .form(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
