pub mod todos;
pub mod users;

pub use todos::TodoService;
pub use users::UserDirectory;
