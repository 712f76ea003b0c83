/// Project model and database operations
///
/// A project owns its memberships and its tasks. Neither child table cascades
/// on delete, so removing a project means deleting its tasks, then its
/// memberships, then the project row (see `service::projects::delete_project`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(50) NOT NULL DEFAULT 'Active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

/// Status given to new projects
pub const DEFAULT_PROJECT_STATUS: &str = "Active";

const PROJECT_COLUMNS: &str = "id, title, description, status, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Free text, `"Active"` unless changed
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
}

/// Partial project update
///
/// `None` leaves a field untouched. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<String>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

impl Project {
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO projects (title, description) VALUES ($1, $2) RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.title)
            .bind(data.description)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Locks the project row until the surrounding transaction ends
    ///
    /// Used by writers so a concurrent delete can't remove the project while
    /// they are adding children to it.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Applies only the supplied fields and bumps `updated_at`
    ///
    /// Returns `None` when the project doesn't exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE projects SET updated_at = NOW()");

        if let Some(title) = data.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(status) = data.status {
            builder.push(", status = ").push_bind(status);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(PROJECT_COLUMNS);

        builder
            .build_query_as::<Project>()
            .fetch_optional(executor)
            .await
    }

    /// Deletes the project row only
    ///
    /// Fails with a foreign key violation if tasks or memberships still
    /// reference it.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every project the user holds a membership in, oldest first
    pub async fn list_by_member<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.title, p.description, p.status, p.created_at, p.updated_at
            FROM projects p
            JOIN project_memberships m ON m.project_id = p.id
            WHERE m.user_id = $1
            ORDER BY p.created_at ASC, p.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}
