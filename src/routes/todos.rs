use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{NewTodo, TodoPatch, UpdateTodoRequest},
    routes::envelope,
    services::TodoService,
};
use actix_web::{delete, get, http::StatusCode, post, put, web, HttpResponse};

/// Lists the caller's todos, newest first.
///
/// ## Responses:
/// - `200 OK`: `{"data": [Todo, ...]}`, possibly empty.
/// - `401 Unauthorized`: missing or invalid token.
#[get("/")]
pub async fn list_todos(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
) -> Result<HttpResponse, AppError> {
    let items = todos.list(user.0).await?;
    Ok(envelope(StatusCode::OK, items))
}

/// Lists the caller's todos carrying `tag` (exact match), newest first.
#[get("/tag/{tag}")]
pub async fn list_todos_by_tag(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
    tag: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let items = todos.list_by_tag(user.0, &tag).await?;
    Ok(envelope(StatusCode::OK, items))
}

/// Creates a todo owned by the caller.
///
/// ## Request Body:
/// `title` (required, non-empty), `description`, `completed`, `priority` (0 to 5),
/// `tags`.
///
/// ## Responses:
/// - `201 Created`: `{"data": Todo}`.
/// - `400 Bad Request`: undecodable body, empty title or priority out of range.
#[post("/create")]
pub async fn create_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
    todo_data: web::Json<NewTodo>,
) -> Result<HttpResponse, AppError> {
    let created = todos.create(user.0, todo_data.into_inner()).await?;
    Ok(envelope(StatusCode::CREATED, created))
}

/// Fetches one of the caller's todos. Someone else's todo is a 404.
#[get("/{id}")]
pub async fn get_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let todo = todos.get(user.0, todo_id.into_inner()).await?;
    Ok(envelope(StatusCode::OK, todo))
}

/// Partially updates one of the caller's todos.
///
/// ## Request Body:
/// Any non-empty subset of `title`, `description`, `completed`, `priority`, `tags`.
/// Unknown keys and an empty object are rejected with 400.
#[put("/update/{id}")]
pub async fn update_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
    update: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, AppError> {
    let patch = TodoPatch::from(update.into_inner());
    todos.update(user.0, todo_id.into_inner(), patch).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Deletes one of the caller's todos. A missing id is a 404.
#[delete("/delete/{id}")]
pub async fn delete_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUserId,
    todo_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    todos.delete(user.0, todo_id.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}
