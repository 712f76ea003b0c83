/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/auth/me` - Current user's profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use projectdesk_shared::{
    auth::{jwt, middleware::AuthContext},
    service::users::{self, RegisterUser},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user_id: Uuid,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "nickname": "ada_lovelace",
///   "phone_number": "+15551234567",
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "password": "secret1",
///   "confirm_password": "secret1"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with a [`TokenResponse`]. The body is a [`RegisterUser`]; its
/// field rules run here first so each failing field is reported separately.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email or nickname already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUser>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    req.validate()?;

    let user = users::register_user(&state.db, req).await?;
    let (access_token, refresh_token) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            user_id: user.id,
            access_token,
            refresh_token,
        }),
    ))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
///
/// { "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Malformed email
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = users::authenticate(&state.db, &req.email, &req.password).await?;
    let (access_token, refresh_token) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    tracing::debug!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        user_id: user.id,
        access_token,
        refresh_token,
    }))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Refresh token invalid, expired, or an access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    if req.refresh_token.is_empty() {
        return Err(ApiError::invalid("refresh_token", "Refresh token is required"));
    }

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Profile of the authenticated user, with the global role spelled out
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let profile = users::get_profile(&state.db, auth.user_id).await?;
    let user = profile.user;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        nickname: user.nickname,
        phone_number: user.phone_number,
        first_name: user.first_name,
        last_name: user.last_name,
        role_id: profile.role.id,
        role_name: profile.role.name,
        created_at: user.created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterUser {
        RegisterUser {
            email: "ada@example.com".to_string(),
            nickname: "ada_lovelace".to_string(),
            phone_number: "+15551234567".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_register_request_field_errors() {
        let mut req = valid_request();
        req.phone_number = "5551234567".to_string();
        req.confirm_password = "other".to_string();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone_number"));
        assert!(fields.contains_key("confirm_password"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_register_request_rejects_short_nickname() {
        let mut req = valid_request();
        req.nickname = "ada".to_string();

        let err: ApiError = req.validate().unwrap_err().into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_login_request_email() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
