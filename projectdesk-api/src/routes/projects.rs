/// Project endpoints
///
/// - `POST /v1/projects` - Create a project, caller becomes CREATOR
/// - `GET /v1/projects` - Projects the caller belongs to
/// - `GET /v1/projects/:project_id` - Project with members and tasks
/// - `PATCH /v1/projects/:project_id` - Partial update (CREATOR)
/// - `DELETE /v1/projects/:project_id` - Delete with tasks and memberships (CREATOR)

use super::deserialize_some;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::middleware::AuthContext,
    models::project::{CreateProject, Project, UpdateProject},
    service::projects::{self, ProjectView},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    pub description: Option<String>,
}

/// Absent fields stay as they are; `"description": null` clears the description
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    #[validate(length(min = 1, max = 50, message = "Status must be 1 to 50 characters"))]
    pub status: Option<String>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
        }
    }
}

/// Create a project
///
/// ```text
/// POST /v1/projects
///
/// { "title": "Alpha", "description": "First project" }
/// ```
///
/// # Response
///
/// `201 Created` with the project view; `role` is `CREATOR`.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    req.validate()?;

    let view = projects::create_project(
        &state.db,
        auth.user_id,
        CreateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let views = projects::list_projects_for_user(&state.db, auth.user_id).await?;
    Ok(Json(views))
}

/// # Errors
///
/// - `404 Not Found`: No such project
/// - `403 Forbidden`: Caller is not a member
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectView>> {
    let view = projects::get_project(&state.db, auth.user_id, project_id).await?;
    Ok(Json(view))
}

/// # Errors
///
/// - `404 Not Found`: No such project
/// - `403 Forbidden`: Caller is not the CREATOR
/// - `422 Unprocessable Entity`: Title or status out of bounds
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = projects::update_project(&state.db, auth.user_id, project_id, req.into()).await?;
    Ok(Json(project))
}

/// Responds `204 No Content`
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    projects::delete_project(&state.db, auth.user_id, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
