/// Task model and database operations
///
/// A task belongs to exactly one project. Status and priority are closed
/// enums; any status can be set by an authorized actor, the workflow
/// order below is conventional rather than enforced.
///
/// ```text
/// Grooming → In Progress → Dev → Done
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('grooming', 'in_progress', 'dev', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     project_id UUID NOT NULL REFERENCES projects(id),
///     assignee_id UUID REFERENCES users(id),
///     tester_id UUID REFERENCES users(id),
///     status task_status NOT NULL DEFAULT 'grooming',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Titles are not unique. Lookups by title return every match so callers can
/// detect ambiguity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, project_id, assignee_id, tester_id, \
                            status, priority, created_at, updated_at";

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Grooming,

    #[serde(rename = "In Progress")]
    InProgress,

    Dev,

    Done,
}

impl TaskStatus {
    /// Display name, identical to the JSON representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Grooming => "Grooming",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Dev => "Dev",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    Low,

    #[default]
    Medium,

    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Uuid,

    /// Must be a member of `project_id`
    pub assignee_id: Option<Uuid>,

    /// Any registered user
    pub tester_id: Option<Uuid>,

    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub tester_id: Option<Uuid>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,
}

/// Partial task update
///
/// `None` leaves a field untouched; `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub assignee_id: Option<Option<Uuid>>,
    pub tester_id: Option<Option<Uuid>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee_id.is_none()
            && self.tester_id.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

impl Task {
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            INSERT INTO tasks (project_id, title, description, assignee_id, tester_id, status, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.assignee_id)
            .bind(data.tester_id)
            .bind(data.status)
            .bind(data.priority)
            .fetch_one(executor)
            .await
    }

    /// Finds a task by id within a project
    pub async fn find_in_project<'e, E>(
        executor: E,
        project_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 AND id = $2");

        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Every task in the project with exactly this title
    pub async fn find_by_title<'e, E>(
        executor: E,
        project_id: Uuid,
        title: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 AND title = $2 \
             ORDER BY created_at ASC, id ASC"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(title)
            .fetch_all(executor)
            .await
    }

    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Applies only the supplied fields and bumps `updated_at`
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = data.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(assignee_id) = data.assignee_id {
            builder.push(", assignee_id = ").push_bind(assignee_id);
        }
        if let Some(tester_id) = data.tester_id {
            builder.push(", tester_id = ").push_bind(tester_id);
        }
        if let Some(status) = data.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(priority) = data.priority {
            builder.push(", priority = ").push_bind(priority);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        builder
            .build_query_as::<Task>()
            .fetch_optional(executor)
            .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task of a project, returning how many were removed
    pub async fn delete_by_project<'e, E>(executor: E, project_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Clears `assignee_id` on every task in the project assigned to the user
    pub async fn unassign_user<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE tasks SET assignee_id = NULL, updated_at = NOW() \
             WHERE project_id = $1 AND assignee_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
