/// Project lifecycle
///
/// Creation writes the project and the creator's membership together.
/// Deletion removes tasks, then memberships, then the project, all in one
/// transaction. The foreign keys don't cascade, so any other order fails.

use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{validate_title, ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, ProjectAction};
use crate::models::membership::{CreateMembership, MemberProfile, Membership, ProjectRole};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::Task;

/// A project with its members and tasks, as seen by one actor
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,

    /// The viewing actor's role
    pub role: ProjectRole,

    /// Nickname of the creator
    pub creator: Option<String>,

    /// Creator first
    pub members: Vec<MemberProfile>,

    pub tasks: Vec<Task>,
}

/// Loads a project or fails with `NotFound`
pub(crate) async fn require_project<'e, E>(executor: E, project_id: Uuid) -> ServiceResult<Project>
where
    E: PgExecutor<'e>,
{
    Project::find_by_id(executor, project_id)
        .await?
        .ok_or_else(|| ServiceError::project_not_found(project_id))
}

/// Like [`require_project`], but holds a row lock until the transaction ends
pub(crate) async fn lock_project<'e, E>(executor: E, project_id: Uuid) -> ServiceResult<Project>
where
    E: PgExecutor<'e>,
{
    Project::find_by_id_for_update(executor, project_id)
        .await?
        .ok_or_else(|| ServiceError::project_not_found(project_id))
}

/// Maximum length of the free-text project status
pub const MAX_STATUS_LEN: usize = 50;

fn validate_status(status: &str) -> ServiceResult<()> {
    let len = status.trim().chars().count();
    if len == 0 || len > MAX_STATUS_LEN {
        return Err(ServiceError::Validation(format!(
            "Status must be between 1 and {} characters",
            MAX_STATUS_LEN
        )));
    }

    Ok(())
}

async fn assemble_view(pool: &PgPool, project: Project, role: ProjectRole) -> ServiceResult<ProjectView> {
    let members = Membership::list_profiles_by_project(pool, project.id).await?;
    let tasks = Task::list_by_project(pool, project.id).await?;

    let creator = members
        .iter()
        .find(|m| m.role.is_creator())
        .map(|m| m.nickname.clone());

    Ok(ProjectView {
        project,
        role,
        creator,
        members,
        tasks,
    })
}

/// Creates a project with the actor as its CREATOR
pub async fn create_project(
    pool: &PgPool,
    actor: Uuid,
    data: CreateProject,
) -> ServiceResult<ProjectView> {
    validate_title(&data.title)?;

    let mut tx = pool.begin().await?;

    let project = Project::create(&mut *tx, data).await?;
    Membership::create(
        &mut *tx,
        CreateMembership {
            project_id: project.id,
            user_id: actor,
            role: ProjectRole::Creator,
        },
    )
    .await?;

    tx.commit().await?;

    info!(project_id = %project.id, user_id = %actor, "Project created");

    assemble_view(pool, project, ProjectRole::Creator).await
}

/// Any member may view a project
pub async fn get_project(pool: &PgPool, actor: Uuid, project_id: Uuid) -> ServiceResult<ProjectView> {
    let project = require_project(pool, project_id).await?;
    let role = authorize(pool, project_id, actor, ProjectAction::ViewProject).await?;

    assemble_view(pool, project, role).await
}

/// Applies a partial update; CREATOR only
///
/// An empty patch returns the project unchanged.
pub async fn update_project(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    data: UpdateProject,
) -> ServiceResult<Project> {
    if let Some(ref title) = data.title {
        validate_title(title)?;
    }
    if let Some(ref status) = data.status {
        validate_status(status)?;
    }

    let mut tx = pool.begin().await?;

    let project = lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::UpdateProject).await?;

    if data.is_empty() {
        debug!(%project_id, "Empty project update, nothing to do");
        return Ok(project);
    }

    let updated = Project::update(&mut *tx, project_id, data)
        .await?
        .ok_or_else(|| ServiceError::project_not_found(project_id))?;

    tx.commit().await?;

    info!(%project_id, user_id = %actor, "Project updated");

    Ok(updated)
}

/// Deletes a project with its tasks and memberships; CREATOR only
///
/// A rejected delete leaves the project and all its children untouched.
pub async fn delete_project(pool: &PgPool, actor: Uuid, project_id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::DeleteProject).await?;

    let tasks = Task::delete_by_project(&mut *tx, project_id).await?;
    let memberships = Membership::delete_by_project(&mut *tx, project_id).await?;
    Project::delete(&mut *tx, project_id).await?;

    tx.commit().await?;

    info!(
        %project_id,
        user_id = %actor,
        tasks,
        memberships,
        "Project deleted"
    );

    Ok(())
}

/// Every project the actor belongs to, oldest first
///
/// Empty when the actor has no memberships.
pub async fn list_projects_for_user(pool: &PgPool, actor: Uuid) -> ServiceResult<Vec<ProjectView>> {
    let projects = Project::list_by_member(pool, actor).await?;

    let mut views = Vec::with_capacity(projects.len());
    for project in projects {
        let Some(role) = Membership::get_role(pool, project.id, actor).await? else {
            // Membership removed between the two queries
            continue;
        };
        views.push(assemble_view(pool, project, role).await?);
    }

    Ok(views)
}
