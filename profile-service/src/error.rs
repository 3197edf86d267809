use axum::{
    response::{IntoResponse, Response},
    Json,
};
use profiles_shared::{error::ServiceError, models::ErrorResponse};

/// HTTP face of the shared `ServiceError`
#[derive(Debug)]
pub struct AppError(pub ServiceError);

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = self.0.client_message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Rejecting request: status={}, message={}", status, message);
        }

        (status, Json(ErrorResponse { message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
