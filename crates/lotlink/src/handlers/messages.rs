//! Chat message handlers.
//!
//! A delivery is the conversation. Messages are addressed to the other
//! participant unless the sender names a recipient explicitly.

use axum::{
    extract::{rejection::FormRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use uuid::Uuid;

use lotlink_core::marketplace::{
    counterpart_of, validate_message, DeliveryError, MarkReadRequest, Message,
    SendMessageRequest,
};
use lotlink_core::storage::{CountResponse, MessageQuery, RepositoryError};

use crate::{
    handlers::{
        error::{
            delivery_error, error_response, form_error, message_error, query_error,
            repository_error,
        },
        AppError,
    },
    state::AppState,
};

/// List a delivery's conversation, oldest first (GET /api/deliveries/{id}/messages).
pub async fn list_messages(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError> {
    if state.delivery_repo.get_delivery(delivery_id).await?.is_none() {
        return Err(RepositoryError::not_found("Delivery", delivery_id).into());
    }

    let messages = state
        .message_repo
        .list_messages(&MessageQuery::conversation(delivery_id))
        .await?;
    Ok(Json(messages))
}

/// Send a message on a delivery (POST /api/deliveries/{id}/messages).
pub async fn send_message(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    form_result: Result<Form<SendMessageRequest>, FormRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    let delivery = state
        .delivery_repo
        .get_delivery(delivery_id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                format!("Delivery {delivery_id} not found"),
            )
        })?;

    if !delivery.is_participant(payload.sender_id) {
        return Err(delivery_error(DeliveryError::NotAParticipant(
            payload.sender_id.to_string(),
        )));
    }

    let recipient_id = match payload.recipient_id {
        Some(recipient_id) if delivery.is_participant(recipient_id) => recipient_id,
        Some(recipient_id) => {
            return Err(delivery_error(DeliveryError::NotAParticipant(
                recipient_id.to_string(),
            )))
        }
        None => counterpart_of(&delivery, payload.sender_id).map_err(delivery_error)?,
    };

    let message = payload.into_message(delivery_id, recipient_id);
    validate_message(&message).map_err(message_error)?;

    state
        .message_repo
        .create_message(&message)
        .await
        .map_err(repository_error)?;

    tracing::info!(
        message_id = %message.id,
        delivery_id = %delivery_id,
        sender_id = %message.sender_id,
        recipient_id = %recipient_id,
        "Message sent"
    );

    Ok((StatusCode::CREATED, Json(message)))
}

/// Get a single message (GET /api/messages/{id}).
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    let message = state
        .message_repo
        .get_message(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Message", id))?;
    Ok(Json(message))
}

/// Mark one message read (POST /api/messages/{id}/read).
///
/// Marking an already read message is a no-op and publishes nothing.
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    let message = state
        .message_repo
        .get_message(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Message", id))?;

    if message.read {
        return Ok(Json(message));
    }

    let message = message.mark_read();
    state.message_repo.update_message(&message).await?;

    tracing::debug!(message_id = %id, delivery_id = %message.delivery_id, "Message read");

    Ok(Json(message))
}

/// Mark every unread message for a recipient read
/// (POST /api/deliveries/{id}/messages/read).
///
/// Returns how many messages changed.
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    form_result: Result<Form<MarkReadRequest>, FormRejection>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    let unread = state
        .message_repo
        .list_messages(&MessageQuery::unread_for(delivery_id, payload.recipient_id))
        .await
        .map_err(repository_error)?;

    let mut count = 0;
    for message in unread {
        state
            .message_repo
            .update_message(&message.mark_read())
            .await
            .map_err(repository_error)?;
        count += 1;
    }

    tracing::info!(
        delivery_id = %delivery_id,
        recipient_id = %payload.recipient_id,
        count,
        "Conversation marked read"
    );

    Ok(Json(CountResponse { count }))
}

/// Counted read over messages (GET /api/messages/count).
///
/// Filters: `delivery_id`, `recipient_id`, `read`. This is the query the
/// unread counter issues.
pub async fn count_messages(
    State(state): State<AppState>,
    query_result: Result<Query<MessageQuery>, QueryRejection>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    let Query(query) = query_result.map_err(query_error)?;

    let count = state
        .message_repo
        .count_messages(&query)
        .await
        .map_err(repository_error)?;

    Ok(Json(CountResponse { count }))
}
