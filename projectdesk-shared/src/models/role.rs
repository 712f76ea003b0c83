/// System roles
///
/// Rows are seeded by the users migration and never created at runtime.
///
/// ```sql
/// CREATE TABLE roles (
///     id INTEGER PRIMARY KEY,
///     name VARCHAR(50) NOT NULL UNIQUE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Role assigned to newly registered users
pub const DEFAULT_ROLE_ID: i32 = 1;

/// Role with full administrative rights over the installation
pub const SUPER_ADMIN_ROLE_ID: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

impl Role {
    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
