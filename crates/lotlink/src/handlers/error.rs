use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lotlink_core::marketplace::{DeliveryError, MessageError};
use lotlink_core::realtime::FeedError;
use lotlink_core::storage::{
    delivery_error_to_status_code, message_error_to_status_code, repository_error_to_status_code,
    RepositoryError,
};

/// Application error type that wraps `anyhow::Error`.
///
/// Known domain errors are mapped to their HTTP status; everything else is a
/// 500.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<DeliveryError>() {
            delivery_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<MessageError>() {
            message_error_to_status_code(err)
        } else if self.0.downcast_ref::<FeedError>().is_some() {
            503
        } else {
            500
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(status = %status_code, error = %self.0, "Application error");
        } else {
            tracing::warn!(status = %status_code, error = %self.0, "API error");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Error response with message (for form validation errors).
pub fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, String) {
    let msg = message.into();
    tracing::warn!(status = %status, message = %msg, "API error");
    (status, msg)
}

/// Maps a form body rejection to a 400.
pub fn form_error(err: FormRejection) -> (StatusCode, String) {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Failed to parse form: {err}"),
    )
}

/// Maps a query string rejection to a 400.
pub fn query_error(err: QueryRejection) -> (StatusCode, String) {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Failed to parse query: {err}"),
    )
}

/// Maps a repository error to its status and message.
pub fn repository_error(err: RepositoryError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(repository_error_to_status_code(&err))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.to_string())
}

pub fn delivery_error(err: DeliveryError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(delivery_error_to_status_code(&err))
        .unwrap_or(StatusCode::BAD_REQUEST);
    error_response(status, err.to_string())
}

pub fn message_error(err: MessageError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(message_error_to_status_code(&err))
        .unwrap_or(StatusCode::BAD_REQUEST);
    error_response(status, err.to_string())
}
