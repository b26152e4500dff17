pub mod auth;
pub mod debug;
pub mod health;
pub mod todos;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

use crate::auth::{AuthMiddleware, BasicAuthMiddleware};
use crate::error::AppError;

/// Success body: `{"data": ...}`.
#[derive(Serialize)]
struct DataEnvelope<T> {
    data: T,
}

pub(crate) fn envelope<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(DataEnvelope { data })
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("invalid path parameter: {}", err)).into()
    })
}

/// Mounts the `/api/v1` routes. Expects `UserDirectory`, `TodoService`,
/// `TokenService`, `BasicAuthConfig` and `PrometheusHandle` to be registered as
/// `web::Data`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/api/v1")
                .service(health::health)
                .service(
                    web::scope("/debug")
                        .wrap(BasicAuthMiddleware)
                        .service(debug::vars),
                )
                .service(
                    web::scope("/user")
                        .service(auth::register)
                        .service(auth::login),
                )
                .service(
                    web::scope("/todos")
                        .wrap(AuthMiddleware)
                        .service(todos::list_todos)
                        .service(todos::create_todo)
                        .service(todos::list_todos_by_tag)
                        .service(todos::get_todo)
                        .service(todos::update_todo)
                        .service(todos::delete_todo),
                ),
        );
}
