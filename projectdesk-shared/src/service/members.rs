/// Membership management
///
/// Members are addressed by nickname. Adding and removing are CREATOR-only;
/// listing is open to any member.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::projects::{lock_project, require_project};
use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, is_creator, ProjectAction};
use crate::models::membership::{CreateMembership, MemberProfile, Membership, ProjectRole};
use crate::models::task::Task;
use crate::models::user::User;

/// Adds the user with `nickname` to the project as a MEMBER
///
/// # Errors
///
/// - `NotFound` when the project or nickname doesn't exist
/// - `PermissionDenied` unless the actor is the CREATOR
/// - `Conflict` when the user is already in the project, including when a
///   concurrent add for the same user commits first
pub async fn add_member(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    nickname: &str,
) -> ServiceResult<MemberProfile> {
    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::AddMember).await?;

    let user = User::find_by_nickname(&mut *tx, nickname)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(nickname))?;

    if Membership::find(&mut *tx, project_id, user.id).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "User '{}' is already a member of this project",
            nickname
        )));
    }

    let membership = Membership::create(
        &mut *tx,
        CreateMembership {
            project_id,
            user_id: user.id,
            role: ProjectRole::Member,
        },
    )
    .await?;

    tx.commit().await?;

    info!(%project_id, user_id = %user.id, added_by = %actor, "Member added");

    Ok(MemberProfile {
        user_id: user.id,
        nickname: user.nickname,
        first_name: user.first_name,
        last_name: user.last_name,
        role: membership.role,
    })
}

/// Removes the user with `nickname` from the project
///
/// Tasks assigned to the removed user become unassigned. The CREATOR's own
/// membership can't be removed.
pub async fn remove_member(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    nickname: &str,
) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::RemoveMember).await?;

    let user = User::find_by_nickname(&mut *tx, nickname)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(nickname))?;

    if is_creator(&mut *tx, project_id, user.id).await? {
        return Err(ServiceError::Conflict(
            "The project creator cannot be removed".to_string(),
        ));
    }

    // Returning before commit also rolls back the unassignment
    let unassigned = Task::unassign_user(&mut *tx, project_id, user.id).await?;
    if !Membership::delete(&mut *tx, project_id, user.id).await? {
        return Err(ServiceError::NotFound(format!(
            "Membership of '{}' in this project",
            nickname
        )));
    }

    tx.commit().await?;

    info!(
        %project_id,
        user_id = %user.id,
        removed_by = %actor,
        unassigned,
        "Member removed"
    );

    Ok(())
}

/// Members of a project, creator first; any member may list
pub async fn list_members(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
) -> ServiceResult<Vec<MemberProfile>> {
    require_project(pool, project_id).await?;
    authorize(pool, project_id, actor, ProjectAction::ListMembers).await?;

    Ok(Membership::list_profiles_by_project(pool, project_id).await?)
}
