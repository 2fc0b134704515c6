//! SurrealDB store implementations.

mod account;
mod activity;

pub use account::SurrealAccountStore;
pub use activity::SurrealActivityStore;
