//! Meshgate Database: SurrealDB connection management and store
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The account aggregate store ([`SurrealAccountStore`])
//! - The append-only activity store ([`SurrealActivityStore`])
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{SurrealAccountStore, SurrealActivityStore};
pub use schema::run_migrations;
