/// Database models for ProjectDesk
///
/// Each model owns its SQL. Operations take any `sqlx::PgExecutor`, so the
/// same call works against the pool or inside a transaction (`&mut *tx`).
///
/// # Models
///
/// - `role`: System-wide user roles (seeded by migrations)
/// - `user`: User accounts
/// - `project`: Projects
/// - `membership`: User-project relationships with CREATOR/MEMBER roles
/// - `task`: Tasks scoped to a project
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::models::project::{CreateProject, Project};
/// use projectdesk_shared::models::membership::{CreateMembership, Membership, ProjectRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// let project = Project::create(&mut *tx, CreateProject {
///     title: "Alpha".to_string(),
///     description: None,
/// }).await?;
/// Membership::create(&mut *tx, CreateMembership {
///     project_id: project.id,
///     user_id,
///     role: ProjectRole::Creator,
/// }).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod membership;
pub mod project;
pub mod role;
pub mod task;
pub mod user;
