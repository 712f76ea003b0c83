/// Task endpoints
///
/// Tasks are addressed by id, or by title under `/tasks/by-title/:title`.
///
/// - `GET /v1/projects/:project_id/tasks` - List tasks (any member)
/// - `POST /v1/projects/:project_id/tasks` - Create a task (CREATOR)
/// - `GET /v1/projects/:project_id/tasks/:task_id` - Read a task (any member)
/// - `PATCH /v1/projects/:project_id/tasks/:task_id` - Partial update (CREATOR)
/// - `DELETE /v1/projects/:project_id/tasks/:task_id` - Delete (CREATOR)
/// - `PATCH`, `DELETE /v1/projects/:project_id/tasks/by-title/:title`
///
/// A title matching more than one task in the project yields `409 Conflict`.

use super::deserialize_some;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskPriority, TaskStatus, UpdateTask},
    service::tasks::{self, NewTask, TaskRef},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// Defaults to the caller
    pub assignee_id: Option<Uuid>,

    pub tester_id: Option<Uuid>,

    /// Defaults to `Grooming`
    pub status: Option<TaskStatus>,

    /// Defaults to `Medium`
    pub priority: Option<TaskPriority>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            assignee_id: req.assignee_id,
            tester_id: req.tester_id,
            status: req.status,
            priority: req.priority,
        }
    }
}

/// Absent fields stay as they are; `null` clears description, assignee, or tester
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub tester_id: Option<Option<Uuid>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            assignee_id: req.assignee_id,
            tester_id: req.tester_id,
            status: req.status,
            priority: req.priority,
        }
    }
}

/// Body of a task delete
///
/// `deleted` is false when the task was already gone.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    pub deleted: bool,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = tasks::list_tasks_for_project(&state.db, auth.user_id, project_id).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// ```text
/// POST /v1/projects/:project_id/tasks
///
/// { "title": "Fix bug", "priority": "High" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the CREATOR
/// - `404 Not Found`: Assignee is not a member, or tester doesn't exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = tasks::create_task(&state.db, auth.user_id, project_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Task>> {
    let task = tasks::get_task(&state.db, auth.user_id, project_id, &TaskRef::Id(task_id)).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    patch(&state, auth, project_id, TaskRef::Id(task_id), req).await
}

pub async fn update_task_by_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, title)): Path<(Uuid, String)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    patch(&state, auth, project_id, TaskRef::Title(title), req).await
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted =
        tasks::delete_task(&state.db, auth.user_id, project_id, &TaskRef::Id(task_id)).await?;
    Ok(Json(DeleteTaskResponse { deleted }))
}

pub async fn delete_task_by_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, title)): Path<(Uuid, String)>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let deleted =
        tasks::delete_task(&state.db, auth.user_id, project_id, &TaskRef::Title(title)).await?;
    Ok(Json(DeleteTaskResponse { deleted }))
}

async fn patch(
    state: &AppState,
    auth: AuthContext,
    project_id: Uuid,
    task_ref: TaskRef,
    req: UpdateTaskRequest,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = tasks::update_task(&state.db, auth.user_id, project_id, &task_ref, req.into()).await?;
    Ok(Json(task))
}
