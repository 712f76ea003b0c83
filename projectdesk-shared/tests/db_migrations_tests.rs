/// Integration tests for database migrations
///
/// These tests require a running PostgreSQL database and are ignored by default.
/// Run with: cargo test -p projectdesk-shared --test db_migrations_tests -- --ignored

mod common;

use common::setup_pool;
use projectdesk_shared::db::migrations::{get_migration_status, run_migrations};
use projectdesk_shared::db::pool::close_pool;
use projectdesk_shared::models::role::{Role, DEFAULT_ROLE_ID, SUPER_ADMIN_ROLE_ID};

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_migrations_are_idempotent() {
    let pool = setup_pool().await;

    let first = get_migration_status(&pool).await.expect("Failed to get status");

    run_migrations(&pool).await.expect("Second migration run failed");

    let second = get_migration_status(&pool).await.expect("Failed to get status");
    assert_eq!(first, second, "Migrations should be idempotent");

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_get_migration_status_after_migrations() {
    let pool = setup_pool().await;

    let status = get_migration_status(&pool).await.expect("Failed to get migration status");

    assert_eq!(status.applied_migrations, 3);
    assert!(status.latest_version.is_some());
    assert!(status.is_up_to_date, "Should be up to date after migrations");

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_migration_creates_all_tables() {
    let pool = setup_pool().await;

    for table_name in ["roles", "users", "projects", "project_memberships", "tasks"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for table {}: {}", table_name, e));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_migration_creates_enums() {
    let pool = setup_pool().await;

    for enum_name in ["project_role", "task_status", "task_priority"] {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT FROM pg_type WHERE typname = $1)")
                .bind(enum_name)
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|e| panic!("Failed to check for enum {}: {}", enum_name, e));

        assert!(exists, "Enum '{}' should exist after migrations", enum_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_roles_are_seeded() {
    let pool = setup_pool().await;

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY id")
        .fetch_all(&pool)
        .await
        .expect("Failed to list roles");

    assert_eq!(names, vec!["User".to_string(), "SuperAdmin".to_string()]);

    let default_role = Role::find_by_id(&pool, DEFAULT_ROLE_ID).await.unwrap().unwrap();
    assert_eq!(default_role.name, "User");

    let admin_role = Role::find_by_id(&pool, SUPER_ADMIN_ROLE_ID).await.unwrap().unwrap();
    assert_eq!(admin_role.name, "SuperAdmin");

    close_pool(pool).await;
}
