/// User model and database operations
///
/// Users register once and then take part in any number of projects through
/// the `project_memberships` table. The identifier never changes.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     nickname VARCHAR(50) NOT NULL UNIQUE,
///     phone_number VARCHAR(16) NOT NULL,
///     first_name VARCHAR(50) NOT NULL,
///     last_name VARCHAR(50) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     role_id INTEGER NOT NULL DEFAULT 1 REFERENCES roles(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "bob@example.com".to_string(),
///     nickname: "bobby".to_string(),
///     phone_number: "+15550001".to_string(),
///     first_name: "Bob".to_string(),
///     last_name: "Builder".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let same = User::find_by_nickname(&pool, "bobby").await?;
/// assert_eq!(same.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Nickname length bounds (inclusive, in characters)
pub const NICKNAME_MIN_LEN: usize = 5;
pub const NICKNAME_MAX_LEN: usize = 50;

const USER_COLUMNS: &str = "id, email, nickname, phone_number, first_name, last_name, \
                            password_hash, role_id, created_at, updated_at";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Lowercased email address, unique across users
    pub email: String,

    /// Public handle used to invite the user into projects, unique across users
    pub nickname: String,

    /// International format: `+` followed by 5 to 15 digits
    pub phone_number: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id PHC string, never the plaintext password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Reference into `roles`
    pub role_id: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub nickname: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Checks the `+` followed by 5 to 15 ASCII digits format
pub fn is_valid_phone_number(value: &str) -> bool {
    match value.strip_prefix('+') {
        Some(digits) => {
            (5..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Checks the nickname length bounds
pub fn is_valid_nickname(value: &str) -> bool {
    (NICKNAME_MIN_LEN..=NICKNAME_MAX_LEN).contains(&value.chars().count())
}

/// Emails are compared case-insensitively; store them lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts a new user with the default role
    ///
    /// # Errors
    ///
    /// Fails with a unique violation (`uq_users_email` / `uq_users_nickname`)
    /// when the email or nickname is taken.
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            INSERT INTO users (email, nickname, phone_number, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(&data.email))
            .bind(data.nickname)
            .bind(data.phone_number)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.password_hash)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(executor)
            .await
    }

    /// Finds a user by nickname (exact match)
    pub async fn find_by_nickname<'e, E>(
        executor: E,
        nickname: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE nickname = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(nickname)
            .fetch_optional(executor)
            .await
    }

    pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_format() {
        assert!(is_valid_phone_number("+12345"));
        assert!(is_valid_phone_number("+123456789012345"));
        assert!(!is_valid_phone_number("+1234"));
        assert!(!is_valid_phone_number("+1234567890123456"));
        assert!(!is_valid_phone_number("12345678"));
        assert!(!is_valid_phone_number("+1234a678"));
        assert!(!is_valid_phone_number("+"));
    }

    #[test]
    fn test_nickname_bounds() {
        assert!(!is_valid_nickname("bob"));
        assert!(is_valid_nickname("bobby"));
        assert!(is_valid_nickname(&"x".repeat(50)));
        assert!(!is_valid_nickname(&"x".repeat(51)));
        // Counted in characters, not bytes
        assert!(is_valid_nickname("ёжики"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "bob@example.com".to_string(),
            nickname: "bobby".to_string(),
            phone_number: "+15550001".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Builder".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["nickname"], "bobby");
    }
}
