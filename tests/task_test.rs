mod common;

use common::app;
use rusty_tasks::error::RustyTasksError;
use rusty_tasks::handlers::tasks::{
    create_task, delete_task, get_task, list_tasks, update_status, update_task, CreateTaskRequest,
    UpdateStatusRequest, UpdateTaskRequest,
};
use rusty_tasks::storage::TaskStatus;

fn new_task(title: &str, due: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        title: Some(title.to_string()),
        due_date: Some(due.to_string()),
    }
}

fn status(status: TaskStatus) -> UpdateStatusRequest {
    UpdateStatusRequest {
        status: Some(status),
    }
}

#[tokio::test]
async fn test_task_crud_for_owner() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;

    let task = create_task(&app.state, &alice, new_task("Write report", "2099-05-01"))
        .await
        .unwrap();
    assert_eq!(task.user_id, alice.subject_id());
    assert_eq!(task.status, TaskStatus::Todo);

    let fetched = get_task(&app.state, &alice, task.id).await.unwrap();
    assert_eq!(fetched, task);

    let renamed = update_task(
        &app.state,
        &alice,
        task.id,
        UpdateTaskRequest {
            title: Some("Write final report".into()),
            due_date: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.title, "Write final report");
    assert_eq!(renamed.due_date, task.due_date);

    let listed = list_tasks(&app.state, &alice).await.unwrap();
    assert_eq!(listed.len(), 1);

    let deleted = delete_task(&app.state, &alice, task.id).await.unwrap();
    assert_eq!(deleted.message, "Task deleted");
    assert!(list_tasks(&app.state, &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_task_validation() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;

    let missing = create_task(&app.state, &alice, CreateTaskRequest::default()).await;
    assert!(matches!(missing, Err(RustyTasksError::ValidationError(_))));

    let bad_date = create_task(&app.state, &alice, new_task("Plan", "next week")).await;
    assert!(matches!(bad_date, Err(RustyTasksError::ValidationError(_))));

    let empty_update = update_task(&app.state, &alice, 1, UpdateTaskRequest::default()).await;
    assert!(matches!(empty_update, Err(RustyTasksError::ValidationError(_))));
}

#[tokio::test]
async fn test_foreign_task_looks_missing() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let bob = app.employee("Bob", "bob@example.com").await;

    let task = create_task(&app.state, &alice, new_task("Private", "2099-01-01"))
        .await
        .unwrap();

    let foreign = get_task(&app.state, &bob, task.id).await.unwrap_err();
    let missing = get_task(&app.state, &bob, 9999).await.unwrap_err();
    assert!(matches!(foreign, RustyTasksError::NotFound(_)));
    assert_eq!(foreign.public_message(), missing.public_message());

    assert!(matches!(
        update_status(&app.state, &bob, task.id, status(TaskStatus::Done)).await,
        Err(RustyTasksError::NotFound(_))
    ));
    assert!(matches!(
        delete_task(&app.state, &bob, task.id).await,
        Err(RustyTasksError::NotFound(_))
    ));
    assert!(list_tasks(&app.state, &bob).await.unwrap().is_empty());

    // Untouched by the failed attempts
    let still_there = get_task(&app.state, &alice, task.id).await.unwrap();
    assert_eq!(still_there.status, TaskStatus::Todo);
}

#[tokio::test]
async fn test_admin_reaches_any_task() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let admin = app.admin("root@example.com").await;

    let task = create_task(&app.state, &alice, new_task("Audit me", "2099-01-01"))
        .await
        .unwrap();

    assert_eq!(get_task(&app.state, &admin, task.id).await.unwrap().id, task.id);
    let moved = update_status(&app.state, &admin, task.id, status(TaskStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(moved.status, TaskStatus::InProgress);
    assert_eq!(moved.user_id, alice.subject_id());
}

#[tokio::test]
async fn test_overdue_tasks_move_to_backlog() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;

    let overdue = create_task(&app.state, &alice, new_task("Late", "2000-01-01"))
        .await
        .unwrap();
    let finished = create_task(&app.state, &alice, new_task("Done late", "2000-01-01"))
        .await
        .unwrap();
    let upcoming = create_task(&app.state, &alice, new_task("Soon", "2099-01-01"))
        .await
        .unwrap();
    update_status(&app.state, &alice, finished.id, status(TaskStatus::Done))
        .await
        .unwrap();

    let listed = list_tasks(&app.state, &alice).await.unwrap();
    let status_of = |id: i64| listed.iter().find(|t| t.id == id).map(|t| t.status);

    assert_eq!(status_of(overdue.id), Some(TaskStatus::Backlog));
    assert_eq!(status_of(finished.id), Some(TaskStatus::Done));
    assert_eq!(status_of(upcoming.id), Some(TaskStatus::Todo));

    // The sweep is persisted
    let stored = get_task(&app.state, &alice, overdue.id).await.unwrap();
    assert_eq!(stored.status, TaskStatus::Backlog);
}

#[tokio::test]
async fn test_done_tasks_are_frozen() {
    let app = app();
    let alice = app.employee("Alice", "alice@example.com").await;
    let task = create_task(&app.state, &alice, new_task("Ship", "2099-01-01"))
        .await
        .unwrap();

    update_status(&app.state, &alice, task.id, status(TaskStatus::Done))
        .await
        .unwrap();

    match update_status(&app.state, &alice, task.id, status(TaskStatus::Todo)).await {
        Err(RustyTasksError::ValidationError(message)) => assert_eq!(message, "Task already DONE"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let missing = update_status(&app.state, &alice, task.id, UpdateStatusRequest::default()).await;
    assert!(matches!(missing, Err(RustyTasksError::ValidationError(_))));
}
