use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;

use super::{with_deadline, StoreError, TodoStore, UserStore};
use crate::models::{NewTodo, NewUser, Todo, TodoField, TodoPatch, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";
const TODO_COLUMNS: &str =
    "id, owner_id, title, description, completed, priority, tags, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool);
        with_deadline(self.query_timeout, query).await
    }
}

#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgTodoStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

/// Builds the UPDATE for `patch`. Column names come from `TodoField::column`,
/// values are placeholders `$1..$n`, followed by the id and owner.
pub fn update_statement(patch: &TodoPatch) -> String {
    let mut param_count = 1;
    let mut assignments: Vec<String> = Vec::with_capacity(patch.fields().len() + 1);
    for field in patch.fields() {
        assignments.push(format!("{} = ${}", field.column(), param_count));
        param_count += 1;
    }
    assignments.push("updated_at = NOW()".to_string());

    format!(
        "UPDATE todos SET {} WHERE id = ${} AND owner_id = ${}",
        assignments.join(", "),
        param_count,
        param_count + 1
    )
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, owner_id: i64, todo: NewTodo) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (owner_id, title, description, completed, priority, tags)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TODO_COLUMNS
        );
        let query = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.priority)
            .bind(&todo.tags)
            .fetch_one(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn list(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        );
        let query = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        let query = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn update(&self, owner_id: i64, id: i64, patch: &TodoPatch) -> Result<bool, StoreError> {
        let sql = update_statement(patch);
        log::debug!("todo update: {}", sql);

        let mut query = sqlx::query(&sql);
        for field in patch.fields() {
            query = match field {
                TodoField::Title(v) | TodoField::Description(v) => query.bind(v),
                TodoField::Completed(v) => query.bind(*v),
                TodoField::Priority(v) => query.bind(*v),
                TodoField::Tags(v) => query.bind(v),
            };
        }
        let query = query.bind(id).bind(owner_id).execute(&self.pool);

        let result = with_deadline(self.query_timeout, query).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_tag(&self, owner_id: i64, tag: &str) -> Result<Vec<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE owner_id = $1 AND $2 = ANY(tags)
             ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        );
        let query = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .bind(tag)
            .fetch_all(&self.pool);
        with_deadline(self.query_timeout, query).await
    }

    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let query = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool);
        let result = with_deadline(self.query_timeout, query).await?;
        Ok(result.rows_affected() > 0)
    }
}
