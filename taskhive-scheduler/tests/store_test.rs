#![cfg(feature = "integration_test")]

/// Integration tests for the PostgreSQL reminder store
///
/// Run against a real PostgreSQL instance:
///
/// ```bash
/// DATABASE_URL=postgres://... \
///     cargo test -p taskhive-scheduler --features integration_test
/// ```

use chrono::{Duration, Utc};
use sqlx::PgPool;
use taskhive_scheduler::store::{PgReminderStore, ReminderStore};
use taskhive_scheduler::sweep::ReminderWindow;
use taskhive_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
use taskhive_shared::models::user::{CreateUser, User};
use uuid::Uuid;

async fn connect() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("database reachable");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    pool
}

async fn seed_user(pool: &PgPool) -> User {
    User::create(
        pool,
        CreateUser {
            name: "Store Test".to_string(),
            email: format!("store-{}@example.com", Uuid::new_v4()),
            password_hash: "unused".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn seed_task(pool: &PgPool, assignee: &User, remind_at: chrono::DateTime<Utc>) -> Task {
    Task::create(
        pool,
        CreateTask {
            title: "Store test task".to_string(),
            description: "Exercises the reminder window query".to_string(),
            priority: TaskPriority::Low,
            due_at: remind_at + Duration::days(1),
            remind_at,
            assigned_to: assignee.id,
            created_by: assignee.id,
        },
    )
    .await
    .unwrap()
}

async fn cleanup(pool: &PgPool, user: &User) {
    sqlx::query("DELETE FROM tasks WHERE assigned_to = $1")
        .bind(user.id)
        .execute(pool)
        .await
        .unwrap();
    User::delete(pool, user.id).await.unwrap();
}

#[tokio::test]
async fn test_window_select_joins_assignee_email() {
    let pool = connect().await;
    let user = seed_user(&pool).await;
    let now = Utc::now();
    let task = seed_task(&pool, &user, now).await;

    let due = PgReminderStore::new(pool.clone())
        .due_reminders(&ReminderWindow::around(now))
        .await
        .unwrap();

    let found = due.iter().find(|d| d.task.id == task.id).expect("in window");
    assert_eq!(found.assignee_email.as_deref(), Some(user.email.as_str()));

    cleanup(&pool, &user).await;
}

#[tokio::test]
async fn test_window_select_excludes_completed_and_sent() {
    let pool = connect().await;
    let user = seed_user(&pool).await;
    let now = Utc::now();
    let store = PgReminderStore::new(pool.clone());

    let completed = seed_task(&pool, &user, now).await;
    Task::set_status(&pool, completed.id, TaskStatus::Completed)
        .await
        .unwrap();

    let sent = seed_task(&pool, &user, now).await;
    assert!(store.mark_reminder_sent(sent.id).await.unwrap());

    let due = store.due_reminders(&ReminderWindow::around(now)).await.unwrap();
    assert!(!due.iter().any(|d| d.task.id == completed.id));
    assert!(!due.iter().any(|d| d.task.id == sent.id));

    cleanup(&pool, &user).await;
}

#[tokio::test]
async fn test_mark_reminder_sent_flips_exactly_once() {
    let pool = connect().await;
    let user = seed_user(&pool).await;
    let task = seed_task(&pool, &user, Utc::now()).await;
    let store = PgReminderStore::new(pool.clone());

    assert!(store.mark_reminder_sent(task.id).await.unwrap());
    // Second attempt loses the guard and reports no flip.
    assert!(!store.mark_reminder_sent(task.id).await.unwrap());

    let refreshed = store.refresh(task.id).await.unwrap().unwrap();
    assert!(refreshed.reminder_sent);

    cleanup(&pool, &user).await;
}

#[tokio::test]
async fn test_deleted_assignee_yields_no_email() {
    let pool = connect().await;
    let user = seed_user(&pool).await;
    let now = Utc::now();
    let task = seed_task(&pool, &user, now).await;

    User::delete(&pool, user.id).await.unwrap();

    let due = PgReminderStore::new(pool.clone())
        .due_reminders(&ReminderWindow::around(now))
        .await
        .unwrap();
    let found = due.iter().find(|d| d.task.id == task.id).expect("in window");
    assert!(found.assignee_email.is_none());

    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task.id)
        .execute(&pool)
        .await
        .unwrap();
}
