//! Group domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MeshError, MeshResult};
use crate::models::activity::EventMeta;

/// Provenance of a group.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupIssued {
    /// Created through the management API by a user.
    #[default]
    Api,
    /// Propagated from JWT group claims.
    Jwt,
    /// Created by an external integration.
    Integration,
}

/// A named set of peers used to target ACL policies, routes and DNS
/// rules. Owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Immutable after creation.
    pub id: String,
    /// Name visible in the UI. Not guaranteed unique.
    pub name: String,
    pub issued: GroupIssued,
    /// Peer IDs. Order is preserved but carries no meaning.
    pub peers: Vec<String>,
}

impl Group {
    /// Build a new group with a freshly generated ID.
    pub fn new(name: impl Into<String>, issued: GroupIssued, peers: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            issued,
            peers,
        }
    }

    /// Audit metadata describing this group.
    pub fn event_meta(&self) -> EventMeta {
        let mut meta = EventMeta::new();
        meta.insert("name".into(), self.name.clone().into());
        meta
    }

    pub fn contains_peer(&self, peer_id: &str) -> bool {
        self.peers.iter().any(|p| p == peer_id)
    }

    /// Append `peer_id` unless already present. Returns whether the
    /// peer was added.
    pub fn add_peer(&mut self, peer_id: &str) -> bool {
        if self.contains_peer(peer_id) {
            return false;
        }
        self.peers.push(peer_id.to_owned());
        true
    }

    /// Remove every occurrence of `peer_id`. Returns whether anything
    /// was removed.
    pub fn remove_peer(&mut self, peer_id: &str) -> bool {
        let before = self.peers.len();
        self.peers.retain(|p| p != peer_id);
        self.peers.len() != before
    }
}

/// Kind of a [`GroupUpdateOperation`]. Serialized as its numeric code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "i32", into = "i32")]
pub enum GroupUpdateOperationType {
    /// Set the name to the first value.
    RenameGroup,
    /// Ensure the values are present, appended last, without duplicates.
    InsertPeers,
    /// Drop the values that are present; absent ones are ignored.
    RemovePeers,
    /// Replace the peer list verbatim.
    ReplacePeers,
}

impl GroupUpdateOperationType {
    pub fn code(self) -> i32 {
        match self {
            GroupUpdateOperationType::RenameGroup => 0,
            GroupUpdateOperationType::InsertPeers => 1,
            GroupUpdateOperationType::RemovePeers => 2,
            GroupUpdateOperationType::ReplacePeers => 3,
        }
    }

    /// Decode a numeric operation code received from a caller.
    pub fn from_code(code: i32) -> MeshResult<Self> {
        match code {
            0 => Ok(GroupUpdateOperationType::RenameGroup),
            1 => Ok(GroupUpdateOperationType::InsertPeers),
            2 => Ok(GroupUpdateOperationType::RemovePeers),
            3 => Ok(GroupUpdateOperationType::ReplacePeers),
            other => Err(MeshError::validation(format!(
                "unknown group update operation type: {other}"
            ))),
        }
    }
}

impl TryFrom<i32> for GroupUpdateOperationType {
    type Error = MeshError;

    fn try_from(code: i32) -> MeshResult<Self> {
        Self::from_code(code)
    }
}

impl From<GroupUpdateOperationType> for i32 {
    fn from(kind: GroupUpdateOperationType) -> Self {
        kind.code()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupUpdateOperation {
    pub kind: GroupUpdateOperationType,
    pub values: Vec<String>,
}

impl GroupUpdateOperation {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            kind: GroupUpdateOperationType::RenameGroup,
            values: vec![name.into()],
        }
    }

    pub fn insert_peers<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: GroupUpdateOperationType::InsertPeers,
            values: peers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remove_peers<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: GroupUpdateOperationType::RemovePeers,
            values: peers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn replace_peers<I, S>(peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: GroupUpdateOperationType::ReplacePeers,
            values: peers.into_iter().map(Into::into).collect(),
        }
    }
}
