//! Meshgate Core: domain models, error types, per-account locking and
//! the collaborator traits implemented by the storage and propagation
//! layers.

pub mod error;
pub mod lock;
pub mod models;
pub mod repository;

pub use error::{GroupLinkError, MeshError, MeshResult};
pub use lock::{AccountLockGuard, AccountLocks};
