//! Activity (audit) event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form audit payload. Different activities carry different shapes.
pub type EventMeta = serde_json::Map<String, serde_json::Value>;

/// Kind of state-changing action recorded in the activity log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Activity {
    GroupCreated,
    GroupUpdated,
    GroupDeleted,
    GroupAddedToPeer,
    GroupRemovedFromPeer,
}

impl Activity {
    /// Stable integer code persisted by activity stores.
    pub fn code(self) -> i64 {
        match self {
            Activity::GroupCreated => 16,
            Activity::GroupUpdated => 17,
            Activity::GroupAddedToPeer => 18,
            Activity::GroupRemovedFromPeer => 19,
            Activity::GroupDeleted => 20,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            16 => Some(Activity::GroupCreated),
            17 => Some(Activity::GroupUpdated),
            18 => Some(Activity::GroupAddedToPeer),
            19 => Some(Activity::GroupRemovedFromPeer),
            20 => Some(Activity::GroupDeleted),
            _ => None,
        }
    }

    /// Human-readable description.
    pub fn message(self) -> &'static str {
        match self {
            Activity::GroupCreated => "Group created",
            Activity::GroupUpdated => "Group updated",
            Activity::GroupDeleted => "Group deleted",
            Activity::GroupAddedToPeer => "Group added to peer",
            Activity::GroupRemovedFromPeer => "Group removed from peer",
        }
    }

    /// Dotted code for downstream consumers.
    pub fn string_code(self) -> &'static str {
        match self {
            Activity::GroupCreated => "group.add",
            Activity::GroupUpdated => "group.update",
            Activity::GroupDeleted => "group.delete",
            Activity::GroupAddedToPeer => "group.peer.add",
            Activity::GroupRemovedFromPeer => "group.peer.delete",
        }
    }
}

/// Immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEvent {
    /// Assigned by the store on insert; `0` until persisted.
    pub id: u64,
    /// Event time, set by the caller.
    pub timestamp: DateTime<Utc>,
    pub activity: Activity,
    pub initiator_id: String,
    pub target_id: String,
    pub account_id: String,
    pub meta: EventMeta,
}

impl ActivityEvent {
    /// Build an unpersisted event stamped with the current time.
    pub fn new(
        activity: Activity,
        initiator_id: impl Into<String>,
        target_id: impl Into<String>,
        account_id: impl Into<String>,
        meta: EventMeta,
    ) -> Self {
        Self {
            id: 0,
            timestamp: Utc::now(),
            activity,
            initiator_id: initiator_id.into(),
            target_id: target_id.into(),
            account_id: account_id.into(),
            meta,
        }
    }
}
