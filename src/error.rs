use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::ServiceError;
use tracing::{error, warn};

use crate::schemas::{ApiResponse, ErrorResponse};

/// Error returned by every handler, rendered as an [`ErrorResponse`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

/// Handler result carrying the success envelope.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            body: ErrorResponse {
                error: message.clone(),
                code: code.to_string(),
                success: false,
                errors: vec![message],
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => {
                warn!("Validation failed: {:?}", errors);
                Self {
                    status: StatusCode::BAD_REQUEST,
                    body: ErrorResponse {
                        error: errors.join(" "),
                        code: "VALIDATION_ERROR".to_string(),
                        success: false,
                        errors,
                    },
                }
            }
            ServiceError::InvalidPeriod(e) => {
                warn!("{}", e);
                Self::new(StatusCode::BAD_REQUEST, "INVALID_PERIOD", e.to_string())
            }
            ServiceError::NotFound(message) => {
                warn!("{}", message);
                Self::not_found(message)
            }
            ServiceError::Forbidden(message) => {
                warn!("{}", message);
                Self::forbidden(message)
            }
            ServiceError::Database(e) => {
                error!("Database error: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error",
                )
            }
            ServiceError::Storage(e) => {
                error!("Storage error: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to store the uploaded file",
                )
            }
            ServiceError::Identity(message) => {
                error!("Identity provider error: {}", message);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IDENTITY_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Unwraps a lookup, turning `None` into a 404 with `message`.
pub fn found<T>(value: Option<T>, message: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| {
        warn!("{}", message);
        ApiError::not_found(message)
    })
}

/// Turns the outcome of a delete-style operation into a 404 when nothing
/// matched.
pub fn affected(done: bool, message: &str) -> Result<(), ApiError> {
    if done {
        Ok(())
    } else {
        warn!("{}", message);
        Err(ApiError::not_found(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let validation: ApiError =
            ServiceError::Validation(vec!["Code is required.".into(), "Name is required.".into()])
                .into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.errors.len(), 2);
        assert_eq!(validation.body.code, "VALIDATION_ERROR");

        let missing: ApiError = ServiceError::not_found("Course not found.").into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.body.error, "Course not found.");

        let forbidden: ApiError = ServiceError::Forbidden("Nope.".into()).into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let period: ApiError = ServiceError::from(common::PeriodError::InvalidPeriod(99)).into();
        assert_eq!(period.status(), StatusCode::BAD_REQUEST);
        assert_eq!(period.body.code, "INVALID_PERIOD");
    }
}
