/// Registration and credential checks
///
/// The identity side is a collaborator of the project core: it produces the
/// actor id that every other service function takes.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{ServiceError, ServiceResult};
use crate::auth::password::{hash_password, verify_password};
use crate::models::role::Role;
use crate::models::user::{is_valid_nickname, is_valid_phone_number, CreateUser, User};

fn validate_nickname(value: &str) -> Result<(), ValidationError> {
    if is_valid_nickname(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("nickname");
    err.message = Some("Nickname must be 5 to 50 characters".into());
    Err(err)
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if is_valid_phone_number(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("phone_number");
    err.message = Some("Phone number must start with '+' followed by 5 to 15 digits".into());
    Err(err)
}

/// Registration input, also the body of `POST /v1/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_nickname"))]
    pub nickname: String,

    /// International format, e.g. `+15551234567`
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(length(min = 3, max = 50, message = "First name must be 3 to 50 characters"))]
    pub first_name: String,

    #[validate(length(min = 3, max = 50, message = "Last name must be 3 to 50 characters"))]
    pub last_name: String,

    #[validate(length(min = 5, max = 50, message = "Password must be 5 to 50 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// A user together with their system role
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub role: Role,
}

/// Registers a new user
///
/// # Errors
///
/// - `Validation` when a field breaks the registration rules
/// - `Conflict` when the email or nickname is taken
pub async fn register_user(pool: &PgPool, data: RegisterUser) -> ServiceResult<User> {
    data.validate()?;

    if User::find_by_email(pool, &data.email).await?.is_some() {
        return Err(ServiceError::Conflict("Email is already registered".to_string()));
    }
    if User::find_by_nickname(pool, &data.nickname).await?.is_some() {
        return Err(ServiceError::Conflict("Nickname is already taken".to_string()));
    }

    let password_hash = hash_password(&data.password)?;

    let user = User::create(
        pool,
        CreateUser {
            email: data.email,
            nickname: data.nickname,
            phone_number: data.phone_number,
            first_name: data.first_name,
            last_name: data.last_name,
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, nickname = %user.nickname, "User registered");

    Ok(user)
}

/// Checks an email/password pair
///
/// Unknown email and wrong password both yield `InvalidCredentials`.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> ServiceResult<User> {
    let Some(user) = User::find_by_email(pool, email).await? else {
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(user)
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> ServiceResult<UserProfile> {
    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {}", user_id)))?;

    let role = Role::find_by_id(pool, user.role_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Role {}", user.role_id)))?;

    Ok(UserProfile { user, role })
}
