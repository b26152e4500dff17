use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::info;

use todo_service::{
    auth::TokenService,
    config::Config,
    db, metrics, routes,
    services::{TodoService, UserDirectory},
    store::{PgTodoStore, PgUserStore},
};

fn startup_error<E: std::fmt::Display>(context: &str, error: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = db::connect(&config.db)
        .await
        .map_err(|e| startup_error("failed to connect to database", e))?;
    db::migrate(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;
    info!("database connection pool established");

    let query_timeout = config.db.query_timeout;
    let users = web::Data::new(UserDirectory::new(Arc::new(PgUserStore::new(
        pool.clone(),
        query_timeout,
    ))));
    let todos = web::Data::new(TodoService::new(Arc::new(PgTodoStore::new(
        pool,
        query_timeout,
    ))));
    let tokens = web::Data::new(TokenService::new(&config.token));
    let basic = web::Data::new(config.basic.clone());
    let metrics_handle = web::Data::new(
        metrics::init_metrics().map_err(|e| startup_error("failed to install metrics", e))?,
    );

    let allowed_origin = config.cors_allowed_origin.clone();
    info!("starting server at {}", config.server_url());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(users.clone())
            .app_data(todos.clone())
            .app_data(tokens.clone())
            .app_data(basic.clone())
            .app_data(metrics_handle.clone())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
