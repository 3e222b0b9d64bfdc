mod common;

use common::{app, app_with, config, PASS};
use rusty_tasks::auth::user::Role;
use rusty_tasks::config::AdminSeedConfig;
use rusty_tasks::error::RustyTasksError;
use rusty_tasks::handlers::admin::{
    delete_task, delete_user, ensure_configured_admin, list_all_tasks, list_users, seed_admin,
    update_role, RoleUpdateRequest, SeedRequest,
};
use rusty_tasks::handlers::tasks::{create_task, CreateTaskRequest};

fn seed_request(email: &str) -> SeedRequest {
    SeedRequest {
        name: None,
        email: Some(email.to_string()),
        password: Some(PASS.to_string()),
    }
}

fn role(value: &str) -> RoleUpdateRequest {
    RoleUpdateRequest {
        role: Some(value.to_string()),
    }
}

#[tokio::test]
async fn test_admin_routes_refuse_employees() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;

    assert!(matches!(
        list_users(&app.state, &alice).await,
        Err(RustyTasksError::Forbidden)
    ));
    assert!(matches!(
        list_all_tasks(&app.state, &alice).await,
        Err(RustyTasksError::Forbidden)
    ));
    assert!(matches!(
        update_role(&app.state, &alice, alice.subject_id(), role("ADMIN")).await,
        Err(RustyTasksError::Forbidden)
    ));
    assert!(matches!(
        delete_user(&app.state, &alice, alice.subject_id()).await,
        Err(RustyTasksError::Forbidden)
    ));
}

#[tokio::test]
async fn test_list_users_hides_hashes() {
    let app = app();
    app.employee("Alice", "alice@example.com").await;
    let admin = app.admin("root@example.com").await;

    let users = list_users(&app.state, &admin).await.unwrap();
    assert_eq!(users.len(), 2);

    let rendered = serde_json::to_string(&users).unwrap();
    assert!(!rendered.contains("argon2"));
    assert!(!rendered.to_lowercase().contains("password"));
}

#[tokio::test]
async fn test_update_role() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let admin = app.admin("root@example.com").await;

    let invalid = update_role(&app.state, &admin, alice.subject_id(), role("SUPERUSER")).await;
    match invalid {
        Err(RustyTasksError::ValidationError(message)) => assert_eq!(message, "Invalid role"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let missing_user = update_role(&app.state, &admin, 999, role("ADMIN")).await;
    assert!(matches!(missing_user, Err(RustyTasksError::NotFound(_))));

    let promoted = update_role(&app.state, &admin, alice.subject_id(), role("ADMIN"))
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    // Tokens keep the role they were issued with until a fresh login
    assert!(!alice.is_admin());
    let fresh = app.identity("alice@example.com").await;
    assert!(fresh.is_admin());
}

#[tokio::test]
async fn test_delete_user_removes_their_tasks() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let bob = app.employee("Bob", "bob@example.com").await;
    let admin = app.admin("root@example.com").await;

    for (owner, title) in [(&alice, "A1"), (&alice, "A2"), (&bob, "B1")] {
        create_task(
            &app.state,
            owner,
            CreateTaskRequest {
                title: Some(title.to_string()),
                due_date: Some("2099-01-01".to_string()),
            },
        )
        .await
        .unwrap();
    }

    let deleted = delete_user(&app.state, &admin, alice.subject_id()).await.unwrap();
    assert_eq!(deleted.message, "User deleted");

    let remaining = list_all_tasks(&app.state, &admin).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].task.title, "B1");
    assert_eq!(
        remaining[0].user.as_ref().map(|owner| owner.email.as_str()),
        Some("bob@example.com")
    );

    assert!(matches!(
        delete_user(&app.state, &admin, alice.subject_id()).await,
        Err(RustyTasksError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_admin_deletes_any_task() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let admin = app.admin("root@example.com").await;

    let task = create_task(
        &app.state,
        &alice,
        CreateTaskRequest {
            title: Some("Spam".into()),
            due_date: Some("2099-01-01".into()),
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        delete_task(&app.state, &alice, task.id).await,
        Err(RustyTasksError::Forbidden)
    ));
    delete_task(&app.state, &admin, task.id).await.unwrap();
    assert!(matches!(
        delete_task(&app.state, &admin, task.id).await,
        Err(RustyTasksError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_seed_is_open_only_until_an_admin_exists() {
    let app = app();

    let created = seed_admin(&app.state, None, seed_request("root@example.com"))
        .await
        .unwrap();
    assert_eq!(created.message, "Admin created");
    assert_eq!(created.email, "root@example.com");

    let anonymous = seed_admin(&app.state, None, seed_request("second@example.com")).await;
    assert!(matches!(anonymous, Err(RustyTasksError::MissingToken)));

    let alice = app.employee("Alice", "alice@example.com").await;
    let employee = seed_admin(&app.state, Some(&alice), seed_request("second@example.com")).await;
    assert!(matches!(employee, Err(RustyTasksError::Forbidden)));

    let admin = app.identity("root@example.com").await;
    let second = seed_admin(&app.state, Some(&admin), seed_request("second@example.com"))
        .await
        .unwrap();
    assert_eq!(second.message, "Admin created");
}

#[tokio::test]
async fn test_seed_promotes_existing_account() {
    let app = app();
    app.register("Alice", "alice@example.com").await;

    let ensured = seed_admin(&app.state, None, seed_request("alice@example.com"))
        .await
        .unwrap();
    assert_eq!(ensured.message, "Admin ensured");

    let user = app
        .state
        .users()
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::Admin);
    assert!(user.verified);
}

#[tokio::test]
async fn test_seed_requires_credentials() {
    let app = app();
    let result = seed_admin(&app.state, None, SeedRequest::default()).await;
    match result {
        Err(RustyTasksError::ValidationError(message)) => {
            assert_eq!(message, "Provide ADMIN_EMAIL and ADMIN_PASSWORD")
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_admin_wins_and_is_ensured_at_startup() {
    let mut config = config();
    config.admin_seed = AdminSeedConfig {
        name: Some("Ops".to_string()),
        email: Some("ops@example.com".to_string()),
        password: Some(PASS.to_string()),
    };
    let app = app_with(config);

    let seeded = ensure_configured_admin(&app.state).await.unwrap().unwrap();
    assert_eq!(seeded.email, "ops@example.com");
    assert_eq!(seeded.message, "Admin created");

    // Running it again is idempotent
    let again = ensure_configured_admin(&app.state).await.unwrap().unwrap();
    assert_eq!(again.message, "Admin ensured");
    assert_eq!(again.id, seeded.id);

    // Request body is ignored in favour of the configured credentials
    let admin = app.identity("ops@example.com").await;
    let via_route = seed_admin(&app.state, Some(&admin), seed_request("other@example.com"))
        .await
        .unwrap();
    assert_eq!(via_route.email, "ops@example.com");
}

#[tokio::test]
async fn test_no_configured_admin() {
    let app = app();
    assert!(ensure_configured_admin(&app.state).await.unwrap().is_none());
}

#[tokio::test]
async fn test_partial_admin_config_is_not_seeded_at_startup() {
    let mut config = config();
    config.admin_seed = AdminSeedConfig {
        name: None,
        email: Some("ops@example.com".to_string()),
        password: None,
    };
    let app = app_with(config);

    assert!(ensure_configured_admin(&app.state).await.unwrap().is_none());
    assert!(app.state.users().list_users().await.unwrap().is_empty());
}
