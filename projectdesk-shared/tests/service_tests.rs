/// Integration tests for the project, membership, and task services
///
/// These tests require a running PostgreSQL database and are ignored by default.
/// Run with: cargo test -p projectdesk-shared --test service_tests -- --ignored

mod common;

use common::{create_user, setup_pool, unique_nickname};
use projectdesk_shared::auth::authorization::{is_creator, is_member};
use projectdesk_shared::models::membership::{Membership, ProjectRole};
use projectdesk_shared::models::project::{CreateProject, UpdateProject};
use projectdesk_shared::models::task::{Task, TaskPriority, TaskStatus, UpdateTask};
use projectdesk_shared::service::tasks::{NewTask, TaskRef};
use projectdesk_shared::service::users::RegisterUser;
use projectdesk_shared::service::{members, projects, tasks, users, ServiceError};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_alpha(pool: &PgPool, actor: Uuid) -> Uuid {
    projects::create_project(
        pool,
        actor,
        CreateProject {
            title: "Alpha".to_string(),
            description: Some("First project".to_string()),
        },
    )
    .await
    .expect("Failed to create project")
    .project
    .id
}

async fn membership_count(pool: &PgPool, project_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM project_memberships WHERE project_id = $1")
        .bind(project_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count memberships")
}

fn titled(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_project_makes_exactly_one_creator() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;

    let view = projects::create_project(
        &pool,
        alice.id,
        CreateProject {
            title: "Alpha".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(view.role, ProjectRole::Creator);
    assert_eq!(view.project.status, "Active");
    assert_eq!(view.creator.as_deref(), Some(alice.nickname.as_str()));

    let memberships = Membership::list_profiles_by_project(&pool, view.project.id)
        .await
        .unwrap();
    let creators: Vec<_> = memberships.iter().filter(|m| m.role.is_creator()).collect();
    assert_eq!(memberships.len(), 1);
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].user_id, alice.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_create_project_rolls_back_when_creator_is_unknown() {
    let pool = setup_pool().await;
    let title = format!("Orphan {}", Uuid::new_v4().simple());

    // No user row, so the creator membership insert fails its foreign key
    let result = projects::create_project(
        &pool,
        Uuid::new_v4(),
        CreateProject {
            title: title.clone(),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Storage(_))));

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE title = $1")
        .bind(&title)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_alpha_scenario() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let project_id = create_alpha(&pool, alice.id).await;

    let added = members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();
    assert_eq!(added.role, ProjectRole::Member);

    assert!(is_creator(&pool, project_id, alice.id).await.unwrap());
    assert!(!is_creator(&pool, project_id, bob.id).await.unwrap());
    assert!(is_member(&pool, project_id, bob.id).await.unwrap());

    tasks::create_task(&pool, alice.id, project_id, titled("Fix bug"))
        .await
        .unwrap();

    let denied = projects::delete_project(&pool, bob.id, project_id).await;
    assert!(matches!(denied, Err(ServiceError::PermissionDenied(_))));

    // Rejected delete changed nothing
    assert!(projects::get_project(&pool, alice.id, project_id).await.is_ok());
    assert_eq!(membership_count(&pool, project_id).await, 2);
    assert_eq!(Task::list_by_project(&pool, project_id).await.unwrap().len(), 1);

    projects::delete_project(&pool, alice.id, project_id)
        .await
        .unwrap();

    let listed = tasks::list_tasks_for_project(&pool, alice.id, project_id).await;
    assert!(listed.unwrap_err().is_not_found());
    assert!(!is_member(&pool, project_id, alice.id).await.unwrap());

    assert_eq!(membership_count(&pool, project_id).await, 0);
    assert!(Task::list_by_project(&pool, project_id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_add_member_twice_conflicts() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let second = members::add_member(&pool, alice.id, project_id, &bob.nickname).await;
    assert!(second.unwrap_err().is_conflict());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_add_member_succeeds_once() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let project_id = create_alpha(&pool, alice.id).await;

    let (first, second) = tokio::join!(
        members::add_member(&pool, alice.id, project_id, &bob.nickname),
        members::add_member(&pool, alice.id, project_id, &bob.nickname),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ServiceError::Conflict(_)))));
    assert_eq!(membership_count(&pool, project_id).await, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_remove_then_add_member_again() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();
    members::remove_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();
    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let listed = members::list_members(&pool, alice.id, project_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].role, ProjectRole::Creator);
    assert_eq!(listed[1].nickname, bob.nickname);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_member_management_rules() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let carol = create_user(&pool, "carol").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    // Members can't manage members
    let result = members::add_member(&pool, bob.id, project_id, &carol.nickname).await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));

    // Unknown nickname
    let result = members::add_member(&pool, alice.id, project_id, &unique_nickname("ghost")).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // Registered but not in the project
    let result = members::remove_member(&pool, alice.id, project_id, &carol.nickname).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // The creator stays
    let result = members::remove_member(&pool, alice.id, project_id, &alice.nickname).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    // Outsiders can't even list
    let result = members::list_members(&pool, carol.id, project_id).await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_removing_member_unassigns_their_tasks() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let task = tasks::create_task(
        &pool,
        alice.id,
        project_id,
        NewTask {
            assignee_id: Some(bob.id),
            ..titled("Review")
        },
    )
    .await
    .unwrap();
    assert_eq!(task.assignee_id, Some(bob.id));

    members::remove_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let task = tasks::get_task(&pool, alice.id, project_id, &TaskRef::Id(task.id))
        .await
        .unwrap();
    assert_eq!(task.assignee_id, None);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_task_partial_update_keeps_other_fields() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let project_id = create_alpha(&pool, alice.id).await;

    let created = tasks::create_task(
        &pool,
        alice.id,
        project_id,
        NewTask {
            priority: Some(TaskPriority::High),
            ..titled("Fix bug")
        },
    )
    .await
    .unwrap();

    assert_eq!(created.status, TaskStatus::Grooming);
    assert_eq!(created.assignee_id, Some(alice.id));

    tasks::update_task(
        &pool,
        alice.id,
        project_id,
        &TaskRef::Title("Fix bug".to_string()),
        UpdateTask {
            status: Some(TaskStatus::Done),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let read_back = tasks::get_task(&pool, alice.id, project_id, &TaskRef::Id(created.id))
        .await
        .unwrap();
    assert_eq!(read_back.status, TaskStatus::Done);
    assert_eq!(read_back.priority, TaskPriority::High);
    assert_eq!(read_back.title, "Fix bug");
    assert_eq!(read_back.assignee_id, Some(alice.id));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_task_permissions_and_references() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let outsider = create_user(&pool, "dave").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let result = tasks::create_task(&pool, bob.id, project_id, titled("Sneaky")).await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));

    // Assignee must belong to the project
    let result = tasks::create_task(
        &pool,
        alice.id,
        project_id,
        NewTask {
            assignee_id: Some(outsider.id),
            ..titled("Outsourced")
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // Tester can be anybody registered
    let task = tasks::create_task(
        &pool,
        alice.id,
        project_id,
        NewTask {
            tester_id: Some(outsider.id),
            ..titled("Tested")
        },
    )
    .await
    .unwrap();
    assert_eq!(task.tester_id, Some(outsider.id));

    // Members read, but don't write
    let listed = tasks::list_tasks_for_project(&pool, bob.id, project_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let result = tasks::update_task(
        &pool,
        bob.id,
        project_id,
        &TaskRef::Id(task.id),
        UpdateTask {
            status: Some(TaskStatus::Dev),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));

    let result = tasks::list_tasks_for_project(&pool, outsider.id, project_id).await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_task_title_addressing() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let project_id = create_alpha(&pool, alice.id).await;

    tasks::create_task(&pool, alice.id, project_id, titled("Duplicate"))
        .await
        .unwrap();
    tasks::create_task(&pool, alice.id, project_id, titled("Duplicate"))
        .await
        .unwrap();

    let by_title = TaskRef::Title("Duplicate".to_string());
    let result = tasks::get_task(&pool, alice.id, project_id, &by_title).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let result = tasks::update_task(
        &pool,
        alice.id,
        project_id,
        &TaskRef::Title("Missing".to_string()),
        UpdateTask {
            status: Some(TaskStatus::Dev),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_delete_task_is_idempotent() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let project_id = create_alpha(&pool, alice.id).await;

    let task = tasks::create_task(&pool, alice.id, project_id, titled("Short lived"))
        .await
        .unwrap();

    let by_title = TaskRef::Title("Short lived".to_string());
    assert!(tasks::delete_task(&pool, alice.id, project_id, &by_title).await.unwrap());
    assert!(!tasks::delete_task(&pool, alice.id, project_id, &by_title).await.unwrap());
    assert!(!tasks::delete_task(&pool, alice.id, project_id, &TaskRef::Id(task.id))
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_update_project_requires_creator() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let project_id = create_alpha(&pool, alice.id).await;

    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();

    let patch = UpdateProject {
        status: Some("Archived".to_string()),
        ..Default::default()
    };

    let result = projects::update_project(&pool, bob.id, project_id, patch.clone()).await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied(_))));

    let updated = projects::update_project(&pool, alice.id, project_id, patch)
        .await
        .unwrap();
    assert_eq!(updated.status, "Archived");
    assert_eq!(updated.title, "Alpha");
    assert_eq!(updated.description.as_deref(), Some("First project"));

    let cleared = projects::update_project(
        &pool,
        alice.id,
        project_id,
        UpdateProject {
            description: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.description, None);

    let result = projects::update_project(&pool, alice.id, Uuid::new_v4(), UpdateProject::default()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_list_projects_for_user() {
    let pool = setup_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    assert!(projects::list_projects_for_user(&pool, bob.id).await.unwrap().is_empty());

    let project_id = create_alpha(&pool, alice.id).await;
    members::add_member(&pool, alice.id, project_id, &bob.nickname)
        .await
        .unwrap();
    tasks::create_task(&pool, alice.id, project_id, titled("Fix bug"))
        .await
        .unwrap();

    let views = projects::list_projects_for_user(&pool, bob.id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].role, ProjectRole::Member);
    assert_eq!(views[0].members.len(), 2);
    assert_eq!(views[0].tasks.len(), 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_register_and_authenticate() {
    let pool = setup_pool().await;
    let nickname = unique_nickname("erin");

    let registration = RegisterUser {
        email: format!("{}@Example.com", nickname),
        nickname: nickname.clone(),
        phone_number: "+15550002".to_string(),
        first_name: "Erin".to_string(),
        last_name: "Example".to_string(),
        password: "hunter22".to_string(),
        confirm_password: "hunter22".to_string(),
    };

    let user = users::register_user(&pool, registration.clone()).await.unwrap();
    assert_eq!(user.email, format!("{}@example.com", nickname));

    let duplicate = users::register_user(&pool, registration.clone()).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    let authenticated = users::authenticate(&pool, &registration.email, "hunter22")
        .await
        .unwrap();
    assert_eq!(authenticated.id, user.id);

    let wrong = users::authenticate(&pool, &registration.email, "hunter23").await;
    assert!(matches!(wrong, Err(ServiceError::InvalidCredentials)));

    let profile = users::get_profile(&pool, user.id).await.unwrap();
    assert_eq!(profile.role.name, "User");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_register_rejects_malformed_email_without_storing() {
    let pool = setup_pool().await;

    for email in ["a b@ex.com", "bob@.", "x@@."] {
        let result = users::register_user(
            &pool,
            RegisterUser {
                email: email.to_string(),
                nickname: unique_nickname("frank"),
                phone_number: "+15550003".to_string(),
                first_name: "Frank".to_string(),
                last_name: "Example".to_string(),
                password: "hunter22".to_string(),
                confirm_password: "hunter22".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))), "{} was accepted", email);

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }
}
