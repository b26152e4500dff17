//! Persistence capabilities.
//!
//! The services only see the `UserStore` and `TodoStore` traits. `postgres`
//! holds the production implementations and `memory` the test doubles.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};

pub use memory::{MemoryTodoStore, MemoryUserStore};
pub use postgres::{PgTodoStore, PgUserStore};

/// Store failures, already classified for the layers above.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource not found")]
    NotFound,
    #[error("a user with that email already exists")]
    DuplicateEmail,
    #[error("a user with that username already exists")]
    DuplicateUsername,
    #[error("store call exceeded its deadline")]
    Timeout,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some("users_email_key") => return StoreError::DuplicateEmail,
                    Some("users_username_key") => return StoreError::DuplicateUsername,
                    _ => {}
                }
            }
        }
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            other => StoreError::Database(other),
        }
    }
}

/// Runs a store call under `deadline`. No retry.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Uniqueness is left to the store's constraints.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, owner_id: i64, todo: NewTodo) -> Result<Todo, StoreError>;
    /// All of the owner's todos, newest first.
    async fn list(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError>;
    /// Applies `patch` to the owner's todo and refreshes `updated_at`.
    /// Returns whether a row matched.
    async fn update(&self, owner_id: i64, id: i64, patch: &TodoPatch) -> Result<bool, StoreError>;
    /// The owner's todos carrying `tag` (exact, case-sensitive), newest first.
    async fn list_by_tag(&self, owner_id: i64, tag: &str) -> Result<Vec<Todo>, StoreError>;
    /// Returns whether a row existed.
    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, StoreError>;
}
