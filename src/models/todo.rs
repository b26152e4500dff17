use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

pub const MIN_PRIORITY: i16 = 0;
pub const MAX_PRIORITY: i16 = 5;

/// A todo as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    /// The owning user. Fixed at creation.
    #[serde(rename = "userID")]
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Between 0 and 5 inclusive.
    pub priority: i16,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todos/create`: the todo fields minus id, owner and timestamps.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTodo {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 5, message = "priority must be between 0 and 5"))]
    pub priority: i16,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /todos/update/{id}`. Absent (or `null`) keys are left alone;
/// unknown keys fail deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i16>,
    pub tags: Option<Vec<String>>,
}

/// One updatable todo field together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoField {
    Title(String),
    Description(String),
    Completed(bool),
    Priority(i16),
    Tags(Vec<String>),
}

impl TodoField {
    /// The column this field is stored in. The only identifiers that ever reach
    /// an UPDATE statement come from here.
    pub fn column(&self) -> &'static str {
        match self {
            TodoField::Title(_) => "title",
            TodoField::Description(_) => "description",
            TodoField::Completed(_) => "completed",
            TodoField::Priority(_) => "priority",
            TodoField::Tags(_) => "tags",
        }
    }

    fn apply(&self, todo: &mut Todo) {
        match self {
            TodoField::Title(v) => todo.title = v.clone(),
            TodoField::Description(v) => todo.description = v.clone(),
            TodoField::Completed(v) => todo.completed = *v,
            TodoField::Priority(v) => todo.priority = *v,
            TodoField::Tags(v) => todo.tags = v.clone(),
        }
    }
}

/// A sparse set of field updates, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    fields: Vec<TodoField>,
}

impl TodoPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field`, replacing an earlier value for the same column.
    pub fn set(mut self, field: TodoField) -> Self {
        self.fields.retain(|f| f.column() != field.column());
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[TodoField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_empty() {
            return Err(AppError::ValidationError("nothing to update".into()));
        }
        for field in &self.fields {
            match field {
                TodoField::Title(title) if title.is_empty() => {
                    return Err(AppError::ValidationError("title must not be empty".into()));
                }
                TodoField::Priority(p) if !(MIN_PRIORITY..=MAX_PRIORITY).contains(p) => {
                    return Err(AppError::ValidationError(
                        "priority must be between 0 and 5".into(),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Applies the patch to an in-memory copy. `updated_at` is the caller's job.
    pub fn apply_to(&self, todo: &mut Todo) {
        for field in &self.fields {
            field.apply(todo);
        }
    }
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(req: UpdateTodoRequest) -> Self {
        let mut patch = TodoPatch::new();
        if let Some(title) = req.title {
            patch = patch.set(TodoField::Title(title));
        }
        if let Some(description) = req.description {
            patch = patch.set(TodoField::Description(description));
        }
        if let Some(completed) = req.completed {
            patch = patch.set(TodoField::Completed(completed));
        }
        if let Some(priority) = req.priority {
            patch = patch.set(TodoField::Priority(priority));
        }
        if let Some(tags) = req.tags {
            patch = patch.set(TodoField::Tags(tags));
        }
        patch
    }
}
