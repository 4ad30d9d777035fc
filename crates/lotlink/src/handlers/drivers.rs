//! Driver handlers.

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use lotlink_core::marketplace::{CreateDriverRequest, Driver, UpdateDriverRequest};
use lotlink_core::serde::deserialize_optional_bool;
use lotlink_core::storage::RepositoryError;

use crate::{
    handlers::{
        error::{error_response, form_error, repository_error},
        AppError,
    },
    state::AppState,
};

/// Query parameters for listing drivers.
#[derive(Debug, Default, Deserialize)]
pub struct ListDriversQuery {
    /// Only drivers currently taking jobs.
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub available: Option<bool>,
}

/// List drivers (GET /api/drivers).
pub async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<ListDriversQuery>,
) -> Result<Json<Vec<Driver>>, AppError> {
    let available_only = query.available.unwrap_or(false);
    Ok(Json(state.driver_repo.list_drivers(available_only).await?))
}

/// Register a driver (POST /api/drivers).
pub async fn create_driver(
    State(state): State<AppState>,
    form_result: Result<Form<CreateDriverRequest>, FormRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Name and email are required",
        ));
    }

    let driver = payload.into_driver();
    state
        .driver_repo
        .create_driver(&driver)
        .await
        .map_err(repository_error)?;

    tracing::info!(driver_id = %driver.id, name = %driver.name, "Registered driver");

    Ok((StatusCode::CREATED, Json(driver)))
}

/// Get a single driver (GET /api/drivers/{id}).
pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, AppError> {
    state
        .driver_repo
        .get_driver(id)
        .await?
        .map(Json)
        .ok_or_else(|| RepositoryError::not_found("Driver", id).into())
}

/// Update a driver's phone or availability (PATCH /api/drivers/{id}).
pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    form_result: Result<Form<UpdateDriverRequest>, FormRejection>,
) -> Result<Json<Driver>, (StatusCode, String)> {
    let Form(payload) = form_result.map_err(form_error)?;

    let mut driver = state
        .driver_repo
        .get_driver(id)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Driver {id} not found")))?;

    payload.apply_to(&mut driver);
    state
        .driver_repo
        .update_driver(&driver)
        .await
        .map_err(repository_error)?;

    tracing::info!(driver_id = %id, available = driver.available, "Updated driver");

    Ok(Json(driver))
}
