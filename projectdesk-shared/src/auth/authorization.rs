/// Project authorization policy
///
/// Every project action is gated on the actor's membership row for that
/// project, looked up fresh on each call. There is no role cache and no
/// token-embedded role, so a removal takes effect on the next request.
///
/// # Permission Model
///
/// | Action | CREATOR | MEMBER | not a member |
/// |---|---|---|---|
/// | view project, members, tasks | yes | yes | no |
/// | update or delete project | yes | no | no |
/// | add or remove members | yes | no | no |
/// | create, update, delete tasks | yes | no | no |
///
/// The decision itself is [`is_permitted`], a pure function of the role.
/// The async helpers only fetch the role and translate the decision into an
/// [`AuthzError`].
///
/// # Example
///
/// ```no_run
/// use projectdesk_shared::auth::authorization::{authorize, ProjectAction};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, actor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let role = authorize(&pool, project_id, actor, ProjectAction::CreateTask).await?;
/// assert!(role.is_creator());
/// # Ok(())
/// # }
/// ```

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::membership::{Membership, ProjectRole};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Actor holds no membership in the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// Actor is a member but the action needs the creator role
    #[error("Only the project creator may {0}")]
    CreatorRequired(ProjectAction),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Something an actor can attempt against a project or its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAction {
    ViewProject,
    UpdateProject,
    DeleteProject,
    ListMembers,
    AddMember,
    RemoveMember,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl ProjectAction {
    pub const ALL: [ProjectAction; 10] = [
        ProjectAction::ViewProject,
        ProjectAction::UpdateProject,
        ProjectAction::DeleteProject,
        ProjectAction::ListMembers,
        ProjectAction::AddMember,
        ProjectAction::RemoveMember,
        ProjectAction::ListTasks,
        ProjectAction::CreateTask,
        ProjectAction::UpdateTask,
        ProjectAction::DeleteTask,
    ];

    /// The weakest role allowed to perform the action
    pub fn min_role(&self) -> ProjectRole {
        match self {
            ProjectAction::ViewProject | ProjectAction::ListMembers | ProjectAction::ListTasks => {
                ProjectRole::Member
            }
            ProjectAction::UpdateProject
            | ProjectAction::DeleteProject
            | ProjectAction::AddMember
            | ProjectAction::RemoveMember
            | ProjectAction::CreateTask
            | ProjectAction::UpdateTask
            | ProjectAction::DeleteTask => ProjectRole::Creator,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectAction::ViewProject => "view the project",
            ProjectAction::UpdateProject => "update the project",
            ProjectAction::DeleteProject => "delete the project",
            ProjectAction::ListMembers => "list members",
            ProjectAction::AddMember => "add members",
            ProjectAction::RemoveMember => "remove members",
            ProjectAction::ListTasks => "list tasks",
            ProjectAction::CreateTask => "create tasks",
            ProjectAction::UpdateTask => "update tasks",
            ProjectAction::DeleteTask => "delete tasks",
        }
    }
}

impl std::fmt::Display for ProjectAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure policy decision: may an actor holding `role` perform `action`?
///
/// `None` means the actor has no membership in the project.
pub fn is_permitted(role: Option<ProjectRole>, action: ProjectAction) -> bool {
    match (role, action.min_role()) {
        (None, _) => false,
        (Some(ProjectRole::Creator), _) => true,
        (Some(ProjectRole::Member), required) => required == ProjectRole::Member,
    }
}

/// Turns a looked-up role into the policy outcome
pub fn check(
    project_id: Uuid,
    role: Option<ProjectRole>,
    action: ProjectAction,
) -> Result<ProjectRole, AuthzError> {
    match role {
        Some(role) if is_permitted(Some(role), action) => Ok(role),
        Some(_) => Err(AuthzError::CreatorRequired(action)),
        None => Err(AuthzError::NotMember(project_id)),
    }
}

/// True iff the user holds the CREATOR membership of the project
pub async fn is_creator<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let role = Membership::get_role(executor, project_id, user_id).await?;
    Ok(role.map(|r| r.is_creator()).unwrap_or(false))
}

/// True iff the user holds any membership in the project
pub async fn is_member<'e, E>(executor: E, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    Ok(Membership::get_role(executor, project_id, user_id)
        .await?
        .is_some())
}

/// Looks up the actor's role and applies the policy
///
/// Returns the actor's role when permitted.
pub async fn authorize<'e, E>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
    action: ProjectAction,
) -> Result<ProjectRole, AuthzError>
where
    E: PgExecutor<'e>,
{
    let role = Membership::get_role(executor, project_id, user_id).await?;

    let outcome = check(project_id, role, action);
    if let Err(ref e) = outcome {
        tracing::debug!(%project_id, %user_id, ?action, error = %e, "Authorization denied");
    }

    outcome
}
