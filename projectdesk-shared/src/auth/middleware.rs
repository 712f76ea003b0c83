/// Request authentication for Axum
///
/// Extracts the bearer token, validates it as an access token, and yields an
/// [`AuthContext`]. The API server's auth layer stores it in the request
/// extensions; handlers pull it out with `Extension<AuthContext>`.
///
/// The context only says *who* the actor is. What they may do in a given
/// project is decided later by [`crate::auth::authorization`].
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use projectdesk_shared::auth::middleware::authenticate_headers;
///
/// # fn example(headers: &HeaderMap) {
/// match authenticate_headers(headers, "secret-key-at-least-32-bytes-long!!") {
///     Ok(auth) => println!("Request from {}", auth.user_id),
///     Err(e) => eprintln!("Rejected: {}", e),
/// }
/// # }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated actor attached to the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    InvalidToken(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing authorization header"),
            AuthError::InvalidFormat(msg) => write!(f, "{}", msg),
            AuthError::InvalidToken(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        };

        (status, self.to_string()).into_response()
    }
}

/// Resolves the actor from request headers without touching the database
pub fn authenticate_headers(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        JwtError::WrongTokenType { .. } => {
            AuthError::InvalidToken("Access token required".to_string())
        }
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::new(claims.sub))
}
