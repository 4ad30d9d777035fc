//! SSE stream of a user's unread count on one delivery.
//!
//! Each connection owns a server-side `UnreadCounter`. Dropping the stream
//! (client disconnect or shutdown) drops the counter, which releases its
//! change feed subscription.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use uuid::Uuid;

use lotlink_core::storage::RepositoryError;
use lotlink_core::unread::{UnreadCounter, UnreadSnapshot};

use crate::{handlers::AppError, state::AppState};

/// Query parameters for the unread stream.
#[derive(Debug, serde::Deserialize)]
pub struct UnreadQuery {
    /// The viewing user.
    pub user_id: Uuid,
}

fn to_sse_event(sequence: u64, snapshot: &UnreadSnapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_default();
    Event::default()
        .id(sequence.to_string())
        .event("unread")
        .data(data)
}

/// SSE endpoint for unread counts (GET /api/deliveries/{id}/unread).
///
/// Sends the current snapshot immediately, then one frame per change.
pub async fn unread_sse(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    Query(query): Query<UnreadQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.delivery_repo.get_delivery(delivery_id).await?.is_none() {
        return Err(RepositoryError::not_found("Delivery", delivery_id).into());
    }

    let counter = UnreadCounter::new(state.message_repo.clone(), state.change_feed.clone());
    counter.activate(delivery_id, query.user_id);
    let mut updates = counter.subscribe();
    let mut shutdown_rx = state.subscribe_shutdown();

    tracing::debug!(
        delivery_id = %delivery_id,
        user_id = %query.user_id,
        "Unread stream opened"
    );

    let stream = async_stream::stream! {
        // Owned by the stream so it lives exactly as long as the connection.
        let counter = counter;
        let mut sequence = 0u64;

        let snapshot = *updates.borrow_and_update();
        yield Ok(to_sse_event(sequence, &snapshot));

        loop {
            let changed = tokio::select! {
                changed = updates.changed() => changed,
                _ = shutdown_rx.recv() => {
                    tracing::info!("Unread stream received shutdown signal");
                    break;
                }
            };
            if changed.is_err() {
                break;
            }

            sequence += 1;
            let snapshot = *updates.borrow_and_update();
            yield Ok(to_sse_event(sequence, &snapshot));
        }

        counter.deactivate();
        tracing::debug!(delivery_id = %delivery_id, "Unread stream closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
