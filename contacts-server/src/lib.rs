//! contacts-server: HTTP CRUD service for contacts
//!
//! Five routes over `/contacts` map one-to-one onto parameterized
//! statements against a PostgreSQL `contacts` table.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::DatabaseConfig;
pub use db::{ContactRepo, ContactStore, DbError, MemoryContactRepo};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
