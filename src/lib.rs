#![doc = "The `todo_service` library crate."]
#![doc = ""]
#![doc = "Domain models, stores, authentication, services, routing configuration and error"]
#![doc = "handling for the multi-tenant todo backend. The binary (`main.rs`) wires these"]
#![doc = "together against Postgres; the tests wire them against the in-memory stores."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
