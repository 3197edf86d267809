use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Image size '{size} bytes' exceeds the limit '{limit} bytes'")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Request entity too large: {0}")]
    RequestTooLarge(String),

    #[error("Storage write error: {0}")]
    StorageWrite(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Short machine-readable name, used as the "name" half of alarm details.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NotFoundError",
            ServiceError::Unauthorized(_) => "UnauthorizedError",
            ServiceError::ValidationError(_) => "ValidationError",
            ServiceError::Conflict(_) => "ConflictError",
            ServiceError::UnsupportedFormat => "UnsupportedFormatError",
            ServiceError::PayloadTooLarge { .. } => "PayloadTooLargeError",
            ServiceError::RequestTooLarge(_) => "RequestTooLargeError",
            ServiceError::StorageWrite(_) => "StorageWriteError",
            ServiceError::InternalError(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::ValidationError(_)
            | ServiceError::UnsupportedFormat
            | ServiceError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::StorageWrite(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to API clients. Server-side failures keep the
    /// provider-reported error text.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::NotFound(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::ValidationError(msg)
            | ServiceError::Conflict(msg) => msg.clone(),
            ServiceError::StorageWrite(msg) | ServiceError::InternalError(msg) => {
                format!("{}: {}", self.kind(), msg)
            }
            other => other.to_string(),
        }
    }
}

// Helper function to map errors from any AWS service client
pub fn map_aws_error<E, R>(service: &str, operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    ServiceError::InternalError(format!(
        "{} {} error: {}",
        service,
        operation,
        aws_error_message(&err)
    ))
}

// Helper function to map general DynamoDB errors
pub fn map_dynamo_error<E, R>(operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    map_aws_error("DynamoDB", operation, err)
}

// Helper function to map PutItem errors
pub fn map_put_dynamo_error<R>(err: SdkError<PutItemError, R>) -> ServiceError
where
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(service_err)
            if service_err.err().is_conditional_check_failed_exception() =>
        {
            ServiceError::Conflict("Item was modified concurrently".to_string())
        }
        _ => map_dynamo_error("put_item", err),
    }
}

// Helper function to map Query errors
pub fn map_query_dynamo_error<R>(err: SdkError<QueryError, R>) -> ServiceError
where
    R: std::fmt::Debug,
{
    map_dynamo_error("query", err)
}

/// Renders an SDK error with its full source chain so the provider-reported
/// error code and message reach the caller.
pub fn aws_error_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    format!("{}", DisplayErrorContext(err))
}

impl From<serde_dynamo::Error> for ServiceError {
    fn from(err: serde_dynamo::Error) -> Self {
        ServiceError::InternalError(format!("DynamoDB serialization error: {}", err))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::InternalError(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_too_large_message_contains_limit() {
        let err = ServiceError::PayloadTooLarge {
            size: 2_000_000,
            limit: 1_048_576,
        };
        assert_eq!(
            err.to_string(),
            "Image size '2000000 bytes' exceeds the limit '1048576 bytes'"
        );
        assert_eq!(err.kind(), "PayloadTooLargeError");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), err.to_string());
    }

    #[test]
    fn test_server_errors_surface_provider_message() {
        let err = ServiceError::StorageWrite("S3 put_object error: AccessDenied".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.client_message(),
            "StorageWriteError: S3 put_object error: AccessDenied"
        );
        assert_eq!(
            ServiceError::RequestTooLarge("length limit exceeded".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_unsupported_format_message() {
        assert_eq!(
            ServiceError::UnsupportedFormat.to_string(),
            "Unsupported image format"
        );
    }
}
