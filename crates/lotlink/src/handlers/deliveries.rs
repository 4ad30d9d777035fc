//! Delivery handlers.
//!
//! Status changes go through the pure operations in
//! `lotlink_core::marketplace`; event publishing is handled by the publishing
//! repository decorator.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use uuid::Uuid;

use lotlink_core::marketplace::{
    accept_delivery, transition_delivery, validate_delivery, AcceptDeliveryRequest,
    CreateDeliveryRequest, Delivery, ListDeliveriesQuery, UpdateDeliveryRequest,
    UpdateStatusRequest,
};
use lotlink_core::storage::RepositoryError;

use crate::{
    handlers::{
        error::{delivery_error, error_response, form_error, repository_error},
        AppError,
    },
    state::AppState,
};

/// List deliveries, newest first (GET /api/deliveries).
pub async fn list_deliveries(
    State(state): State<AppState>,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<Json<Vec<Delivery>>, AppError> {
    let deliveries = state
        .delivery_repo
        .list_deliveries(query.sales_user_id, query.driver_id, query.status)
        .await?;
    Ok(Json(deliveries))
}

/// Request a delivery or swap (POST /api/deliveries).
pub async fn create_delivery(
    State(state): State<AppState>,
    form_result: Result<Form<CreateDeliveryRequest>, FormRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;
    tracing::debug!(payload = ?payload, "Received create delivery request");

    let sales_user = state
        .sales_user_repo
        .get_sales_user(payload.sales_user_id)
        .await
        .map_err(repository_error)?;
    if sales_user.is_none() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Sales user {} not found", payload.sales_user_id),
        ));
    }

    let delivery = payload.into_delivery();
    validate_delivery(&delivery).map_err(delivery_error)?;

    state
        .delivery_repo
        .create_delivery(&delivery)
        .await
        .map_err(repository_error)?;

    tracing::info!(
        delivery_id = %delivery.id,
        kind = delivery.kind.as_str(),
        vin = %delivery.vin,
        "Created delivery request"
    );

    Ok((StatusCode::CREATED, Json(delivery)))
}

/// Get a single delivery (GET /api/deliveries/{id}).
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    state
        .delivery_repo
        .get_delivery(id)
        .await?
        .map(Json)
        .ok_or_else(|| RepositoryError::not_found("Delivery", id).into())
}

/// How often a write that lost a race is re-read and retried.
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Fetches a delivery or produces a 404 response.
async fn load_delivery(state: &AppState, id: Uuid) -> Result<Delivery, (StatusCode, String)> {
    state
        .delivery_repo
        .get_delivery(id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Delivery {id} not found")))
}

/// Loads a delivery, applies `change` and stores the result only if the row
/// was not written in between.
///
/// When another request wins the race the row is read again and `change`
/// re-runs against the winner's state, so a second driver accepting the same
/// job sees it as already assigned.
async fn modify_delivery<F>(
    state: &AppState,
    id: Uuid,
    mut change: F,
) -> Result<(Delivery, Delivery), (StatusCode, String)>
where
    F: FnMut(&mut Delivery) -> Result<(), (StatusCode, String)>,
{
    for _ in 0..MAX_UPDATE_ATTEMPTS {
        let current = load_delivery(state, id).await?;
        let mut updated = current.clone();
        change(&mut updated)?;

        let applied = state
            .delivery_repo
            .update_delivery_if_unchanged(&current, &updated)
            .await
            .map_err(repository_error)?;
        if applied {
            return Ok((current, updated));
        }
        tracing::debug!(delivery_id = %id, "Concurrent delivery write, retrying");
    }

    Err(error_response(
        StatusCode::CONFLICT,
        format!("Delivery {id} is being changed by another request"),
    ))
}

/// Edit addresses or notes (PUT /api/deliveries/{id}).
///
/// Only deliveries that are not finished can be edited.
pub async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    form_result: Result<Form<UpdateDeliveryRequest>, FormRejection>,
) -> Result<Json<Delivery>, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    let (_, delivery) = modify_delivery(&state, id, |delivery| {
        if delivery.status.is_terminal() {
            return Err(error_response(
                StatusCode::CONFLICT,
                format!("Delivery {id} is {} and can no longer be edited", delivery.status),
            ));
        }
        payload.clone().apply_to(delivery);
        validate_delivery(delivery).map_err(delivery_error)
    })
    .await?;

    tracing::info!(delivery_id = %id, "Updated delivery");

    Ok(Json(delivery))
}

/// A driver takes a requested delivery (POST /api/deliveries/{id}/accept).
///
/// Of two drivers accepting at once, exactly one succeeds; the other gets a
/// 409.
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    form_result: Result<Form<AcceptDeliveryRequest>, FormRejection>,
) -> Result<Json<Delivery>, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;
    load_delivery(&state, id).await?;

    let driver = state
        .driver_repo
        .get_driver(payload.driver_id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Driver {} not found", payload.driver_id),
            )
        })?;

    let (_, delivery) = modify_delivery(&state, id, |delivery| {
        accept_delivery(delivery, driver.id).map_err(delivery_error)
    })
    .await?;

    tracing::info!(delivery_id = %id, driver_id = %driver.id, "Delivery accepted");

    Ok(Json(delivery))
}

/// Move a delivery along its lifecycle (POST /api/deliveries/{id}/status).
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    form_result: Result<Form<UpdateStatusRequest>, FormRejection>,
) -> Result<Json<Delivery>, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    let (previous, delivery) = modify_delivery(&state, id, |delivery| {
        transition_delivery(delivery, payload.status).map_err(delivery_error)
    })
    .await?;

    tracing::info!(
        delivery_id = %id,
        from = previous.status.as_str(),
        to = delivery.status.as_str(),
        "Delivery status changed"
    );

    Ok(Json(delivery))
}
