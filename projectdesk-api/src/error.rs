/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every error becomes a JSON body of the form
/// `{"error": "<code>", "message": "...", "details": [...]}`.
///
/// | Service error | Status |
/// |---|---|
/// | `NotFound` | 404 |
/// | `PermissionDenied` | 403 |
/// | `Conflict` | 409 |
/// | `Validation` | 422 |
/// | `InvalidCredentials` | 401 |
/// | `Storage`, `Internal` | 500, details logged only |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use projectdesk_shared::auth::{jwt::JwtError, middleware::AuthError};
use projectdesk_shared::service::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),

    /// 401
    Unauthorized(String),

    /// 403
    Forbidden(String),

    /// 404
    NotFound(String),

    /// 409, e.g. duplicate membership
    Conflict(String),

    /// 422
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500
    InternalError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. "not_found"
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-field validation failure
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Validation(msg) => ApiError::invalid("body", msg),
            ServiceError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
            ServiceError::Storage(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Project abc not found".to_string());
        assert_eq!(err.to_string(), "Not found: Project abc not found");
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::NotFound("Task".to_string()), StatusCode::NOT_FOUND),
            (ServiceError::PermissionDenied("no".to_string()), StatusCode::FORBIDDEN),
            (ServiceError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (ServiceError::Validation("bad".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                ServiceError::Storage(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (service_error, expected) in cases {
            let api_error: ApiError = service_error.into();
            assert_eq!(api_error.status(), expected);
            assert_eq!(api_error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        let err: ApiError = ServiceError::NotFound("Task 'Fix bug'".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Task 'Fix bug' not found"));
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = AuthError::MissingCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AuthError::InvalidFormat("Expected Bearer token".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error() {
        let err = ApiError::ValidationError(vec![
            ValidationErrorDetail::new("email", "Invalid email format"),
            ValidationErrorDetail::new("password", "Password too short"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
