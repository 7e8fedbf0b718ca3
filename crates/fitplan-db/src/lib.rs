//! PostgreSQL access to the read-only exercise catalog.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
