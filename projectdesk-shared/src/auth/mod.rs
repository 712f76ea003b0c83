/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Access/refresh token issuing and validation
/// - [`middleware`]: Bearer token extraction into an [`middleware::AuthContext`]
/// - [`authorization`]: Project membership policy (CREATOR vs MEMBER)
///
/// Authentication establishes *who* the actor is. Authorization is re-derived
/// from the membership table on every operation and never cached in tokens.
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::auth::password::{hash_password, verify_password};
/// use projectdesk_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
