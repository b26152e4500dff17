use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::metrics;
use crate::models::{NewTodo, Todo, TodoPatch};
use crate::store::TodoStore;

/// Todo operations on behalf of an authenticated owner.
///
/// Every operation is scoped to `owner_id`; a todo belonging to someone else is
/// reported exactly like a missing one.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("no todo found with ID {}", id))
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Rejects an empty title or a priority outside 0..=5 before touching the store.
    pub async fn create(&self, owner_id: i64, todo: NewTodo) -> Result<Todo, AppError> {
        todo.validate()?;
        let created = self.store.create(owner_id, todo).await?;
        log::debug!("user {} created todo {}", owner_id, created.id);
        metrics::record_todo_created();
        Ok(created)
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Todo>, AppError> {
        Ok(self.store.list(owner_id).await?)
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Todo, AppError> {
        match self.store.get_by_id(id).await? {
            Some(todo) if todo.owner_id == owner_id => Ok(todo),
            Some(_) => {
                log::warn!("user {} asked for todo {} owned by someone else", owner_id, id);
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    /// Applies only the fields named in `patch`. An empty patch is an error.
    pub async fn update(&self, owner_id: i64, id: i64, patch: TodoPatch) -> Result<(), AppError> {
        patch.validate()?;
        if self.store.update(owner_id, id, &patch).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    pub async fn list_by_tag(&self, owner_id: i64, tag: &str) -> Result<Vec<Todo>, AppError> {
        Ok(self.store.list_by_tag(owner_id, tag).await?)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), AppError> {
        if self.store.delete(owner_id, id).await? {
            metrics::record_todo_deleted();
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoField;
    use crate::store::MemoryTodoStore;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryTodoStore::new()))
    }

    fn new_todo(title: &str, priority: i16, tags: &[&str]) -> NewTodo {
        NewTodo {
            title: title.into(),
            description: String::new(),
            completed: false,
            priority,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[actix_rt::test]
    async fn test_create_then_get() {
        let todos = service();
        let created = todos.create(1, new_todo("buy milk", 2, &[])).await.unwrap();
        let fetched = todos.get(1, created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.owner_id, 1);
        assert!((0..=5).contains(&fetched.priority));
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[actix_rt::test]
    async fn test_create_rejects_invalid_fields() {
        let todos = service();
        let err = todos.create(1, new_todo("x", 6, &[])).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = todos.create(1, new_todo("", 1, &[])).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert!(todos.list(1).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_list_is_newest_first_and_per_owner() {
        let todos = service();
        let first = todos.create(1, new_todo("first", 0, &[])).await.unwrap();
        let second = todos.create(1, new_todo("second", 0, &[])).await.unwrap();
        todos.create(2, new_todo("not mine", 0, &[])).await.unwrap();

        let listed = todos.list(1).await.unwrap();
        assert_eq!(listed, vec![second, first]);
        assert!(todos.list(3).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_get_enforces_ownership() {
        let todos = service();
        let created = todos.create(1, new_todo("private", 0, &[])).await.unwrap();
        assert!(matches!(todos.get(2, created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(todos.get(1, 999).await, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_update_changes_only_named_fields() {
        let todos = service();
        let before = todos
            .create(1, new_todo("buy milk", 2, &["home", "errand"]))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        todos
            .update(1, before.id, TodoPatch::new().set(TodoField::Completed(true)))
            .await
            .unwrap();
        let after = todos.get(1, before.id).await.unwrap();

        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            after,
            Todo {
                completed: true,
                updated_at: after.updated_at,
                ..before
            }
        );
    }

    #[actix_rt::test]
    async fn test_update_rejects_empty_patch_and_foreign_todo() {
        let todos = service();
        let created = todos.create(1, new_todo("a", 0, &[])).await.unwrap();

        let err = todos.update(1, created.id, TodoPatch::new()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == "nothing to update"));

        let patch = TodoPatch::new().set(TodoField::Priority(4));
        let err = todos.update(2, created.id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(todos.get(1, created.id).await.unwrap().priority, 0);
    }

    #[actix_rt::test]
    async fn test_list_by_tag() {
        let todos = service();
        let older = todos.create(1, new_todo("a", 0, &["urgent"])).await.unwrap();
        todos.create(1, new_todo("b", 0, &["later"])).await.unwrap();
        let newer = todos
            .create(1, new_todo("c", 0, &["work", "urgent"]))
            .await
            .unwrap();
        todos.create(2, new_todo("d", 0, &["urgent"])).await.unwrap();

        let urgent = todos.list_by_tag(1, "urgent").await.unwrap();
        assert_eq!(urgent, vec![newer, older]);
        assert!(todos.list_by_tag(1, "URGENT").await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_delete() {
        let todos = service();
        let created = todos.create(1, new_todo("a", 0, &[])).await.unwrap();

        assert!(matches!(todos.delete(2, created.id).await, Err(AppError::NotFound(_))));
        todos.delete(1, created.id).await.unwrap();
        assert!(matches!(todos.get(1, created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(todos.delete(1, created.id).await, Err(AppError::NotFound(_))));
    }
}
