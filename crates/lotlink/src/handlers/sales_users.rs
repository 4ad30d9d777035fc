//! Sales user handlers.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use lotlink_core::marketplace::{CreateSalesUserRequest, SalesUser};
use lotlink_core::serde::deserialize_optional_uuid;
use lotlink_core::storage::RepositoryError;

use crate::{
    handlers::{
        error::{error_response, form_error, repository_error},
        AppError,
    },
    state::AppState,
};

/// Query parameters for listing sales users.
#[derive(Debug, Default, Deserialize)]
pub struct ListSalesUsersQuery {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub dealer_id: Option<Uuid>,
}

/// List sales users, optionally for one dealer (GET /api/sales-users).
pub async fn list_sales_users(
    State(state): State<AppState>,
    Query(query): Query<ListSalesUsersQuery>,
) -> Result<Json<Vec<SalesUser>>, AppError> {
    Ok(Json(
        state.sales_user_repo.list_sales_users(query.dealer_id).await?,
    ))
}

/// Create a sales user (POST /api/sales-users).
///
/// The dealer must exist.
pub async fn create_sales_user(
    State(state): State<AppState>,
    form_result: Result<Form<CreateSalesUserRequest>, FormRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Name and email are required",
        ));
    }

    let dealer = state
        .dealer_repo
        .get_dealer(payload.dealer_id)
        .await
        .map_err(repository_error)?;
    if dealer.is_none() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Dealer {} not found", payload.dealer_id),
        ));
    }

    let user = payload.into_sales_user();
    state
        .sales_user_repo
        .create_sales_user(&user)
        .await
        .map_err(repository_error)?;

    tracing::info!(sales_user_id = %user.id, dealer_id = %user.dealer_id, "Created sales user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a single sales user (GET /api/sales-users/{id}).
pub async fn get_sales_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalesUser>, AppError> {
    state
        .sales_user_repo
        .get_sales_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| RepositoryError::not_found("SalesUser", id).into())
}
