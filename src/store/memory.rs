//! In-memory stores with the same uniqueness and ordering rules as the
//! PostgreSQL schema. Used as test doubles.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{StoreError, TodoStore, UserStore};
use crate::models::{NewTodo, NewUser, Todo, TodoPatch, User};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn lock<T>(table: &Mutex<Table<T>>) -> MutexGuard<'_, Table<T>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = lock(&self.users);
        // Same order as the unique indexes in the migration.
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if table.rows.values().any(|u| u.username == user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        let id = table.allocate_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = lock(&self.users);
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).rows.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryTodoStore {
    todos: Mutex<Table<Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_newest_first<P>(&self, predicate: P) -> Vec<Todo>
    where
        P: Fn(&Todo) -> bool,
    {
        let table = lock(&self.todos);
        let mut todos: Vec<Todo> = table
            .rows
            .values()
            .filter(|t| predicate(t))
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        todos
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, owner_id: i64, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut table = lock(&self.todos);
        let id = table.allocate_id();
        let now = Utc::now();
        let created = Todo {
            id,
            owner_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            priority: todo.priority,
            tags: todo.tags,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn list(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        Ok(self.collect_newest_first(|t| t.owner_id == owner_id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(lock(&self.todos).rows.get(&id).cloned())
    }

    async fn update(&self, owner_id: i64, id: i64, patch: &TodoPatch) -> Result<bool, StoreError> {
        let mut table = lock(&self.todos);
        match table.rows.get_mut(&id) {
            Some(todo) if todo.owner_id == owner_id => {
                patch.apply_to(todo);
                todo.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_tag(&self, owner_id: i64, tag: &str) -> Result<Vec<Todo>, StoreError> {
        Ok(self.collect_newest_first(|t| {
            t.owner_id == owner_id && t.tags.iter().any(|candidate| candidate == tag)
        }))
    }

    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, StoreError> {
        let mut table = lock(&self.todos);
        let owned = table.rows.get(&id).map_or(false, |t| t.owner_id == owner_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }
}
