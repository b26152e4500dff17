//! Store tests against a live database. Run with `DATABASE_URL` set and
//! `cargo test -- --ignored`.

use std::time::Duration;

use chrono::Utc;
use dotenv::dotenv;
use sqlx::PgPool;
use todo_service::models::{NewTodo, NewUser, TodoField, TodoPatch};
use todo_service::store::{PgTodoStore, PgUserStore, StoreError, TodoStore, UserStore};

const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    todo_service::db::migrate(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default() % 1_000_000_000)
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.into(),
        email: email.into(),
        password_hash: "not-a-real-hash".into(),
    }
}

#[actix_rt::test]
#[ignore]
async fn test_unique_constraints_are_classified() {
    let pool = test_pool().await;
    let users = PgUserStore::new(pool.clone(), QUERY_TIMEOUT);
    let username = unique("u");
    let email = format!("{}@example.com", username);

    let created = users.create(new_user(&username, &email)).await.unwrap();
    assert_eq!(users.find_by_id(created.id).await.unwrap().unwrap().email, email);

    let both = users.create(new_user(&username, &email)).await;
    assert!(matches!(both, Err(StoreError::DuplicateEmail)), "{:?}", both);

    let other_email = format!("other-{}", email);
    let same_name = users.create(new_user(&username, &other_email)).await;
    assert!(matches!(same_name, Err(StoreError::DuplicateUsername)), "{:?}", same_name);

    assert!(users.find_by_email("nobody@nowhere.invalid").await.unwrap().is_none());
    cleanup_user(&pool, &email).await;
}

#[actix_rt::test]
#[ignore]
async fn test_todo_lifecycle() {
    let pool = test_pool().await;
    let users = PgUserStore::new(pool.clone(), QUERY_TIMEOUT);
    let todos = PgTodoStore::new(pool.clone(), QUERY_TIMEOUT);
    let username = unique("t");
    let email = format!("{}@example.com", username);
    let owner = users.create(new_user(&username, &email)).await.unwrap();

    let created = todos
        .create(
            owner.id,
            NewTodo {
                title: "buy milk".into(),
                description: String::new(),
                completed: false,
                priority: 2,
                tags: vec!["home".into(), "shop".into()],
            },
        )
        .await
        .unwrap();
    assert_eq!(created.owner_id, owner.id);
    assert_eq!(created.created_at, created.updated_at);

    let patch = TodoPatch::new()
        .set(TodoField::Priority(4))
        .set(TodoField::Tags(vec!["shop".into()]));
    assert!(!todos.update(owner.id + 1, created.id, &patch).await.unwrap());
    assert!(todos.update(owner.id, created.id, &patch).await.unwrap());

    let fetched = todos.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.priority, 4);
    assert_eq!(fetched.tags, vec!["shop".to_string()]);
    assert_eq!(fetched.title, "buy milk");
    assert!(fetched.updated_at > created.updated_at);

    assert_eq!(todos.list_by_tag(owner.id, "shop").await.unwrap().len(), 1);
    assert!(todos.list_by_tag(owner.id, "home").await.unwrap().is_empty());
    assert_eq!(todos.list(owner.id).await.unwrap(), vec![fetched]);

    assert!(!todos.delete(owner.id + 1, created.id).await.unwrap());
    assert!(todos.delete(owner.id, created.id).await.unwrap());
    assert!(todos.get_by_id(created.id).await.unwrap().is_none());

    cleanup_user(&pool, &email).await;
}
