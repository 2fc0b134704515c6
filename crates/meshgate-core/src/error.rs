//! Error types for the meshgate control plane.

use thiserror::Error;

/// Deletion of a group was vetoed because another entity still
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("group has been linked to {resource}: {name}")]
pub struct GroupLinkError {
    /// Kind of the referencing resource (e.g. `"route"`, `"policy"`).
    pub resource: String,
    /// Display name of the referencing resource.
    pub name: String,
}

impl GroupLinkError {
    pub fn new(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error(transparent)]
    GroupLink(#[from] GroupLinkError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Account or activity storage failed. The mutation is considered
    /// not applied.
    #[error("Database error: {0}")]
    Database(String),

    /// The peer push failed after the account was persisted: the
    /// mutation is committed but peers may be stale.
    #[error("Peer propagation failed: {0}")]
    Propagation(String),

    #[error("Timed out waiting for lock on account {account_id}")]
    LockTimeout { account_id: String },

    #[error("Activity store is closed")]
    StoreClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MeshError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        MeshError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MeshError::Validation {
            message: message.into(),
        }
    }
}

pub type MeshResult<T> = Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_link_error_names_resource_and_display_name() {
        let err: MeshError = GroupLinkError::new("route", "net-a").into();
        assert_eq!(err.to_string(), "group has been linked to route: net-a");
    }

    #[test]
    fn not_found_carries_identity() {
        let err = MeshError::not_found("group", "g1");
        assert_eq!(err.to_string(), "Entity not found: group with id g1");
    }
}
