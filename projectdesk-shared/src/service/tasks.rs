/// Task lifecycle
///
/// Tasks are created, updated, and deleted by the project's CREATOR and
/// readable by every member. A task is addressed either by id or by title;
/// titles aren't unique, so a title that matches several tasks is rejected
/// with `Conflict` instead of picking one.

use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::projects::{lock_project, require_project};
use super::{validate_title, ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, is_member, ProjectAction};
use crate::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crate::models::user::User;

/// How a caller names a task inside a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRef {
    Id(Uuid),
    Title(String),
}

impl std::fmt::Display for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskRef::Id(id) => write!(f, "Task {}", id),
            TaskRef::Title(title) => write!(f, "Task '{}'", title),
        }
    }
}

/// Fields for a new task
///
/// `assignee_id` defaults to the creating actor when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub tester_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Finds the task named by `task_ref` within the project
///
/// `Ok(None)` when nothing matches; `Conflict` when a title is ambiguous.
pub async fn resolve_task<'e, E>(
    executor: E,
    project_id: Uuid,
    task_ref: &TaskRef,
) -> ServiceResult<Option<Task>>
where
    E: PgExecutor<'e>,
{
    match task_ref {
        TaskRef::Id(id) => Ok(Task::find_in_project(executor, project_id, *id).await?),
        TaskRef::Title(title) => {
            let mut matches = Task::find_by_title(executor, project_id, title).await?;
            match matches.len() {
                0 => Ok(None),
                1 => Ok(matches.pop()),
                n => Err(ServiceError::Conflict(format!(
                    "Title '{}' matches {} tasks; address the task by id",
                    title, n
                ))),
            }
        }
    }
}

async fn ensure_assignee_is_member<'e, E>(
    executor: E,
    project_id: Uuid,
    assignee_id: Uuid,
) -> ServiceResult<()>
where
    E: PgExecutor<'e>,
{
    if is_member(executor, project_id, assignee_id).await? {
        return Ok(());
    }

    Err(ServiceError::NotFound(format!(
        "Assignee {} among project members",
        assignee_id
    )))
}

async fn ensure_tester_exists<'e, E>(executor: E, tester_id: Uuid) -> ServiceResult<()>
where
    E: PgExecutor<'e>,
{
    if User::exists(executor, tester_id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("Tester {}", tester_id)))
    }
}

/// Creates a task in the project; CREATOR only
pub async fn create_task(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    data: NewTask,
) -> ServiceResult<Task> {
    validate_title(&data.title)?;

    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::CreateTask).await?;

    let assignee_id = data.assignee_id.unwrap_or(actor);
    ensure_assignee_is_member(&mut *tx, project_id, assignee_id).await?;

    if let Some(tester_id) = data.tester_id {
        ensure_tester_exists(&mut *tx, tester_id).await?;
    }

    let task = Task::create(
        &mut *tx,
        CreateTask {
            project_id,
            title: data.title,
            description: data.description,
            assignee_id: Some(assignee_id),
            tester_id: data.tester_id,
            status: data.status.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
        },
    )
    .await?;

    tx.commit().await?;

    info!(%project_id, task_id = %task.id, user_id = %actor, "Task created");

    Ok(task)
}

/// Reads one task; any member may read
pub async fn get_task(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    task_ref: &TaskRef,
) -> ServiceResult<Task> {
    require_project(pool, project_id).await?;
    authorize(pool, project_id, actor, ProjectAction::ListTasks).await?;

    resolve_task(pool, project_id, task_ref)
        .await?
        .ok_or_else(|| ServiceError::NotFound(task_ref.to_string()))
}

/// Every task of the project, oldest first; any member may list
pub async fn list_tasks_for_project(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
) -> ServiceResult<Vec<Task>> {
    require_project(pool, project_id).await?;
    authorize(pool, project_id, actor, ProjectAction::ListTasks).await?;

    Ok(Task::list_by_project(pool, project_id).await?)
}

/// Applies a partial update to a task; CREATOR only
///
/// Only supplied fields change. A new assignee must be a project member and
/// a new tester must be a registered user.
pub async fn update_task(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    task_ref: &TaskRef,
    data: UpdateTask,
) -> ServiceResult<Task> {
    if let Some(ref title) = data.title {
        validate_title(title)?;
    }

    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::UpdateTask).await?;

    let task = resolve_task(&mut *tx, project_id, task_ref)
        .await?
        .ok_or_else(|| ServiceError::NotFound(task_ref.to_string()))?;

    if let Some(Some(assignee_id)) = data.assignee_id {
        ensure_assignee_is_member(&mut *tx, project_id, assignee_id).await?;
    }
    if let Some(Some(tester_id)) = data.tester_id {
        ensure_tester_exists(&mut *tx, tester_id).await?;
    }

    if data.is_empty() {
        debug!(task_id = %task.id, "Empty task update, nothing to do");
        return Ok(task);
    }

    let updated = Task::update(&mut *tx, task.id, data)
        .await?
        .ok_or_else(|| ServiceError::NotFound(task_ref.to_string()))?;

    tx.commit().await?;

    info!(%project_id, task_id = %updated.id, user_id = %actor, "Task updated");

    Ok(updated)
}

/// Deletes a task; CREATOR only
///
/// Deleting a task that doesn't exist is a no-op and returns `Ok(false)`.
pub async fn delete_task(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    task_ref: &TaskRef,
) -> ServiceResult<bool> {
    let mut tx = pool.begin().await?;

    lock_project(&mut *tx, project_id).await?;
    authorize(&mut *tx, project_id, actor, ProjectAction::DeleteTask).await?;

    let Some(task) = resolve_task(&mut *tx, project_id, task_ref).await? else {
        debug!(%project_id, task = %task_ref, "Task to delete does not exist");
        return Ok(false);
    };

    let deleted = Task::delete(&mut *tx, task.id).await?;

    tx.commit().await?;

    info!(%project_id, task_id = %task.id, user_id = %actor, "Task deleted");

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ref_display() {
        let id = Uuid::new_v4();
        assert_eq!(TaskRef::Id(id).to_string(), format!("Task {}", id));
        assert_eq!(TaskRef::Title("Fix bug".to_string()).to_string(), "Task 'Fix bug'");
    }

    #[test]
    fn test_new_task_defaults() {
        let data: NewTask = serde_json::from_value(serde_json::json!({ "title": "Fix bug" })).unwrap();

        assert_eq!(data.title, "Fix bug");
        assert!(data.assignee_id.is_none());
        assert_eq!(data.status.unwrap_or_default(), TaskStatus::Grooming);
        assert_eq!(data.priority.unwrap_or_default(), TaskPriority::Medium);
    }
}
