/// Error kinds surfaced by service operations
///
/// Every operation returns one of these directly; there is no local retry.
/// Storage failures carry the underlying `sqlx::Error` so the edge can log it.

use uuid::Uuid;

use crate::auth::authorization::AuthzError;
use crate::auth::password::PasswordError;
use crate::models::membership::UNIQUE_MEMBERSHIP_CONSTRAINT;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A project, task, user, or membership reference did not resolve
    #[error("{0} not found")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Duplicate membership, nickname, or email; ambiguous task title
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(sqlx::Error),
}

impl ServiceError {
    pub fn project_not_found(project_id: Uuid) -> Self {
        ServiceError::NotFound(format!("Project {}", project_id))
    }

    pub fn user_not_found(nickname: &str) -> Self {
        ServiceError::NotFound(format!("User '{}'", nickname))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ServiceError::PermissionDenied(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict(_))
    }
}

/// Human-readable message for a violated unique constraint
fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("uq_users_email") => "Email is already registered".to_string(),
        Some("uq_users_nickname") => "Nickname is already taken".to_string(),
        Some(UNIQUE_MEMBERSHIP_CONSTRAINT) => {
            "User is already a member of this project".to_string()
        }
        Some("uq_project_memberships_single_creator") => {
            "Project already has a creator".to_string()
        }
        Some(other) => format!("Duplicate value violates {}", other),
        None => "Duplicate value".to_string(),
    }
}

/// Unique violations become `Conflict`, so a lost check-then-insert race
/// reports the same error kind as the pre-check
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ServiceError::Conflict(conflict_message(db_err.constraint()));
            }
        }

        ServiceError::Storage(err)
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) | AuthzError::CreatorRequired(_) => {
                ServiceError::PermissionDenied(err.to_string())
            }
            AuthzError::DatabaseError(e) => e.into(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Field messages are sorted by field name and joined into one message
impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        ServiceError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorization::ProjectAction;

    #[test]
    fn test_conflict_messages() {
        assert_eq!(
            conflict_message(Some(UNIQUE_MEMBERSHIP_CONSTRAINT)),
            "User is already a member of this project"
        );
        assert_eq!(conflict_message(Some("uq_users_nickname")), "Nickname is already taken");
        assert_eq!(conflict_message(None), "Duplicate value");
    }

    #[test]
    fn test_authz_errors_become_permission_denied() {
        let err: ServiceError = AuthzError::NotMember(Uuid::new_v4()).into();
        assert!(err.is_permission_denied());

        let err: ServiceError = AuthzError::CreatorRequired(ProjectAction::DeleteProject).into();
        assert!(err.is_permission_denied());
        assert_eq!(
            err.to_string(),
            "Permission denied: Only the project creator may delete the project"
        );
    }

    #[test]
    fn test_storage_error_passthrough() {
        let err: ServiceError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ServiceError::Storage(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(ServiceError::user_not_found("bobby").to_string(), "User 'bobby' not found");
    }
}
