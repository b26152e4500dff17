use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DbConfig;

/// Opens the connection pool: at most `max_open_conns` connections, idle ones
/// reaped after `max_idle_time`, and acquisition bounded by the query deadline.
pub async fn connect(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(0)
        .idle_timeout(config.max_idle_time)
        .acquire_timeout(config.query_timeout)
        .connect(&config.url)
        .await
}

pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
