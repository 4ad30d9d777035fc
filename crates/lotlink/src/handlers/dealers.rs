//! Dealer handlers.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use uuid::Uuid;

use lotlink_core::marketplace::{CreateDealerRequest, Dealer};
use lotlink_core::storage::RepositoryError;

use crate::{
    handlers::{
        error::{error_response, form_error, repository_error},
        AppError,
    },
    state::AppState,
};

/// List all dealers (GET /api/dealers).
pub async fn list_dealers(State(state): State<AppState>) -> Result<Json<Vec<Dealer>>, AppError> {
    Ok(Json(state.dealer_repo.list_dealers().await?))
}

/// Create a dealer (POST /api/dealers).
pub async fn create_dealer(
    State(state): State<AppState>,
    form_result: Result<Form<CreateDealerRequest>, FormRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    if payload.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Dealer name cannot be empty",
        ));
    }

    let dealer = payload.into_dealer();
    state
        .dealer_repo
        .create_dealer(&dealer)
        .await
        .map_err(repository_error)?;

    tracing::info!(dealer_id = %dealer.id, name = %dealer.name, "Created dealer");

    Ok((StatusCode::CREATED, Json(dealer)))
}

/// Get a single dealer (GET /api/dealers/{id}).
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Dealer>, AppError> {
    state
        .dealer_repo
        .get_dealer(id)
        .await?
        .map(Json)
        .ok_or_else(|| RepositoryError::not_found("Dealer", id).into())
}
