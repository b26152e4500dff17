pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo, TodoField, TodoPatch, UpdateTodoRequest};
pub use user::{NewUser, User};
