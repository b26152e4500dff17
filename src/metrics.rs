//! Process counters, rendered in Prometheus text format on `/api/v1/debug/vars`.
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests that never call [`init_metrics`] pay nothing.

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const USERS_REGISTERED_TOTAL: &str = "users_registered_total";
pub const LOGINS_TOTAL: &str = "logins_total";
pub const TODOS_CREATED_TOTAL: &str = "todos_created_total";
pub const TODOS_DELETED_TOTAL: &str = "todos_deleted_total";

/// Installs the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(USERS_REGISTERED_TOTAL, "Users successfully registered");
    describe_counter!(LOGINS_TOTAL, "Login attempts by outcome (success/failure)");
    describe_counter!(TODOS_CREATED_TOTAL, "Todos created");
    describe_counter!(TODOS_DELETED_TOTAL, "Todos deleted");

    Ok(handle)
}

pub fn record_registration() {
    counter!(USERS_REGISTERED_TOTAL).increment(1);
}

pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(LOGINS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_todo_created() {
    counter!(TODOS_CREATED_TOTAL).increment(1);
}

pub fn record_todo_deleted() {
    counter!(TODOS_DELETED_TOTAL).increment(1);
}
