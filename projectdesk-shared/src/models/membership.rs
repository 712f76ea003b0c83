/// Project membership model and database operations
///
/// Many-to-many relation between users and projects carrying a role tag.
/// Every project has exactly one `creator` row, written in the same
/// transaction that creates the project. Everybody added afterwards is a
/// `member`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('creator', 'member');
///
/// CREATE TABLE project_memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     role project_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_project_memberships_project_user UNIQUE (project_id, user_id)
/// );
///
/// CREATE UNIQUE INDEX uq_project_memberships_single_creator
///     ON project_memberships (project_id) WHERE role = 'creator';
/// ```
///
/// The `(project_id, user_id)` constraint is what makes two racing
/// "add member" requests for the same user resolve to one success and one
/// unique violation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Name of the `(project_id, user_id)` uniqueness constraint
pub const UNIQUE_MEMBERSHIP_CONSTRAINT: &str = "uq_project_memberships_project_user";

/// Role a user holds inside a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectRole {
    /// Full administrative rights: delete the project, manage members and tasks
    Creator,

    /// Read and participation rights only
    Member,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Creator => "CREATOR",
            ProjectRole::Member => "MEMBER",
        }
    }

    pub fn is_creator(&self) -> bool {
        matches!(self, ProjectRole::Creator)
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub project_id: Uuid,
    pub user_id: Uuid,

    #[serde(default = "default_role")]
    pub role: ProjectRole,
}

fn default_role() -> ProjectRole {
    ProjectRole::Member
}

/// Membership joined with the public part of the user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberProfile {
    pub user_id: Uuid,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub role: ProjectRole,
}

impl Membership {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`UNIQUE_MEMBERSHIP_CONSTRAINT`] when
    /// the user is already in the project, or on the single-creator index when
    /// a second creator is inserted.
    pub async fn create<'e, E>(executor: E, data: CreateMembership) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO project_memberships (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(executor)
        .await
    }

    pub async fn find<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, project_id, user_id, role, created_at
            FROM project_memberships
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// The user's role in the project, `None` if they're not in it
    pub async fn get_role<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT role FROM project_memberships WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes one membership row; false if there was none
    pub async fn delete<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM project_memberships WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every membership of a project, returning how many were removed
    pub async fn delete_by_project<'e, E>(executor: E, project_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM project_memberships WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Members of a project with their nicknames and names, creator first
    pub async fn list_profiles_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<MemberProfile>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT u.id AS user_id, u.nickname, u.first_name, u.last_name, m.role
            FROM project_memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.project_id = $1
            ORDER BY m.role ASC, m.created_at ASC, m.id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
