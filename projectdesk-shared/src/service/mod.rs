/// Project, membership, and task operations
///
/// The transport-agnostic core. Each operation takes an explicit pool handle
/// and the authenticated actor, resolves the actor's membership, applies the
/// policy from [`crate::auth::authorization`], and only then mutates.
///
/// Multi-statement writes run in a single transaction. Returning early with
/// `?` drops the transaction, which rolls it back, so partial state is never
/// visible to other readers.
///
/// # Modules
///
/// - [`projects`]: create, read, update, delete, list for a user
/// - [`members`]: add or remove by nickname, list
/// - [`tasks`]: create, read, update, delete, list; addressed by id or title
/// - [`users`]: registration and credential checks
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::project::CreateProject;
/// use projectdesk_shared::service::{members, projects, ServiceError};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, alice: Uuid, bob: Uuid) -> Result<(), ServiceError> {
/// let alpha = projects::create_project(&pool, alice, CreateProject {
///     title: "Alpha".to_string(),
///     description: None,
/// }).await?;
///
/// members::add_member(&pool, alice, alpha.project.id, "bobby").await?;
///
/// let denied = projects::delete_project(&pool, bob, alpha.project.id).await;
/// assert!(matches!(denied, Err(ServiceError::PermissionDenied(_))));
/// # Ok(())
/// # }
/// ```

pub mod error;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod users;

pub use error::{ServiceError, ServiceResult};

/// Maximum title length accepted for projects and tasks
pub const MAX_TITLE_LEN: usize = 255;

/// Rejects blank or overlong titles
pub(crate) fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Title must not be empty".to_string()));
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }

    Ok(())
}
