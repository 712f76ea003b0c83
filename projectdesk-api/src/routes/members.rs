/// Project membership endpoints
///
/// - `GET /v1/projects/:project_id/members` - List members, creator first
/// - `POST /v1/projects/:project_id/members` - Add a user by nickname (CREATOR)
/// - `DELETE /v1/projects/:project_id/members/:nickname` - Remove a member (CREATOR)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use projectdesk_shared::{
    auth::middleware::AuthContext, models::membership::MemberProfile, service::members,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(min = 1, message = "Nickname is required"))]
    pub nickname: String,
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberProfile>>> {
    let profiles = members::list_members(&state.db, auth.user_id, project_id).await?;
    Ok(Json(profiles))
}

/// Add a user to the project as a MEMBER
///
/// ```text
/// POST /v1/projects/:project_id/members
///
/// { "nickname": "bob_builder" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No such project or nickname
/// - `403 Forbidden`: Caller is not the CREATOR
/// - `409 Conflict`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberProfile>)> {
    req.validate()?;

    let profile = members::add_member(&state.db, auth.user_id, project_id, &req.nickname).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Remove a member; their tasks become unassigned
///
/// # Errors
///
/// - `404 Not Found`: No such project, nickname, or membership
/// - `403 Forbidden`: Caller is not the CREATOR
/// - `409 Conflict`: Target is the CREATOR
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, nickname)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    members::remove_member(&state.db, auth.user_id, project_id, &nickname).await?;
    Ok(StatusCode::NO_CONTENT)
}
