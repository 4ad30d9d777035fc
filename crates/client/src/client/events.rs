//! SSE events operations.

use super::LotlinkClient;
use crate::error::{ClientError, Result};
use crate::sse::{SseBuffer, SseMessage};
use lotlink_core::realtime::{ChangeEvent, ChangeFilter};
use lotlink_core::unread::UnreadSnapshot;
use uuid::Uuid;

/// A change event together with its server-assigned event ID.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReceivedEvent {
    pub id: Option<u64>,
    #[serde(flatten)]
    pub event: ChangeEvent,
}

impl LotlinkClient {
    /// Watch row changes for one table + conversation.
    /// Returns a stream of events.
    pub async fn watch_events(
        &self,
        filter: ChangeFilter,
        last_event_id: Option<u64>,
    ) -> Result<impl futures_core::Stream<Item = Result<ReceivedEvent>>> {
        let response = self.open_event_stream(filter, last_event_id).await?;
        Ok(change_event_stream(response))
    }

    /// Connect to `/api/events`. The returned response owns the connection.
    pub(crate) async fn open_event_stream(
        &self,
        filter: ChangeFilter,
        last_event_id: Option<u64>,
    ) -> Result<reqwest::Response> {
        let mut url = format!(
            "{}/api/events?table={}&conversation_id={}",
            self.base_url,
            filter.table.as_str(),
            filter.conversation_id
        );
        if let Some(id) = last_event_id {
            url.push_str(&format!("&last_event_id={}", id));
        }
        self.open_stream(&url).await
    }

    /// Watch a server-side unread counter for `user_id` on a delivery.
    pub async fn watch_unread(
        &self,
        delivery_id: Uuid,
        user_id: Uuid,
    ) -> Result<impl futures_core::Stream<Item = Result<UnreadSnapshot>>> {
        let url = format!(
            "{}/api/deliveries/{}/unread?user_id={}",
            self.base_url, delivery_id, user_id
        );

        let response = self.open_stream(&url).await?;
        Ok(parse_stream(response, |message| {
            serde_json::from_str(&message.data).map_err(ClientError::from)
        }))
    }

    async fn open_stream(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound {
                resource: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message: "Failed to connect to SSE endpoint".to_string(),
            });
        }
        Ok(response)
    }
}

/// Decode an `/api/events` response into change events.
pub(crate) fn change_event_stream(
    response: reqwest::Response,
) -> impl futures_core::Stream<Item = Result<ReceivedEvent>> {
    parse_stream(response, |message| {
        let event = serde_json::from_str(&message.data)?;
        Ok(ReceivedEvent {
            id: message.id.as_deref().and_then(|id| id.parse().ok()),
            event,
        })
    })
}

/// Turn a streaming response into decoded items. Messages that fail to
/// decode are skipped; a transport error ends the stream.
fn parse_stream<T, F>(
    response: reqwest::Response,
    decode: F,
) -> impl futures_core::Stream<Item = Result<T>>
where
    F: Fn(&SseMessage) -> Result<T>,
{
    async_stream::stream! {
        use tokio_stream::StreamExt;

        let mut byte_stream = response.bytes_stream();
        let mut buffer = SseBuffer::new();

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(chunk) => {
                    for message in buffer.push(&chunk) {
                        match decode(&message) {
                            Ok(item) => yield Ok(item),
                            Err(e) => tracing::debug!(error = %e, "Skipping undecodable SSE message"),
                        }
                    }
                }
                Err(e) => {
                    yield Err(ClientError::Connection(e.to_string()));
                    break;
                }
            }
        }
    }
}
