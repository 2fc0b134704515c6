//! Group membership engine: batched update operations and peer-set
//! diffing.

use std::collections::HashSet;

use meshgate_core::error::{MeshError, MeshResult};
use meshgate_core::models::group::{Group, GroupUpdateOperation, GroupUpdateOperationType};

/// Peers gained and lost between two versions of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl PeerDiff {
    /// Set difference in both directions. Order follows the input
    /// sequences; duplicate IDs collapse to one.
    pub fn between(old: &[String], new: &[String]) -> Self {
        Self {
            added: difference(new, old),
            removed: difference(old, new),
        }
    }

    /// Every peer of a newly created group counts as added.
    pub fn created(peers: &[String]) -> Self {
        Self {
            added: difference(peers, &[]),
            removed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Elements of `a` not in `b`, first occurrence only.
pub fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let exclude: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    a.iter()
        .filter(|x| !exclude.contains(x.as_str()) && seen.insert(x.as_str()))
        .cloned()
        .collect()
}

fn remove_from_list(source: &[String], values: &[String]) -> Vec<String> {
    let drop: HashSet<&str> = values.iter().map(String::as_str).collect();
    source
        .iter()
        .filter(|x| !drop.contains(x.as_str()))
        .cloned()
        .collect()
}

/// Apply `operations` in order to a private copy of `group`.
///
/// The input group is never touched; on error nothing is applied.
pub fn apply_operations(group: &Group, operations: &[GroupUpdateOperation]) -> MeshResult<Group> {
    let mut updated = group.clone();

    for operation in operations {
        match operation.kind {
            GroupUpdateOperationType::RenameGroup => {
                let name = operation.values.first().ok_or_else(|| {
                    MeshError::validation(format!(
                        "rename of group {} requires a name",
                        group.id
                    ))
                })?;
                updated.name = name.clone();
            }
            // Pass-through: uniqueness is the caller's responsibility.
            GroupUpdateOperationType::ReplacePeers => {
                updated.peers = operation.values.clone();
            }
            GroupUpdateOperationType::InsertPeers => {
                let mut peers = remove_from_list(&updated.peers, &operation.values);
                let inserted = difference(&operation.values, &peers);
                peers.extend(inserted);
                updated.peers = peers;
            }
            GroupUpdateOperationType::RemovePeers => {
                updated.peers = remove_from_list(&updated.peers, &operation.values);
            }
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_core::models::group::GroupIssued;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn group(peers: &[&str]) -> Group {
        Group {
            id: "g1".into(),
            name: "G1".into(),
            issued: GroupIssued::Api,
            peers: ids(peers),
        }
    }

    #[test]
    fn difference_keeps_order_and_collapses_duplicates() {
        let a = ids(&["p3", "p1", "p3", "p2"]);
        let b = ids(&["p2"]);
        assert_eq!(difference(&a, &b), ids(&["p3", "p1"]));
    }

    #[test]
    fn diff_between_versions() {
        let diff = PeerDiff::between(&ids(&["p1", "p2"]), &ids(&["p2", "p3"]));
        assert_eq!(diff.added, ids(&["p3"]));
        assert_eq!(diff.removed, ids(&["p1"]));
    }

    #[test]
    fn diff_ignores_reordering() {
        let diff = PeerDiff::between(&ids(&["p1", "p2"]), &ids(&["p2", "p1", "p1"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn created_diff_dedups() {
        let diff = PeerDiff::created(&ids(&["p1", "p1", "p2"]));
        assert_eq!(diff.added, ids(&["p1", "p2"]));
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn insert_then_remove_converges() {
        let updated = apply_operations(
            &group(&[]),
            &[
                GroupUpdateOperation::insert_peers(["a", "b"]),
                GroupUpdateOperation::remove_peers(["a"]),
            ],
        )
        .unwrap();
        assert_eq!(updated.peers, ids(&["b"]));
    }

    #[test]
    fn insert_moves_existing_peers_last_without_duplicates() {
        let updated = apply_operations(
            &group(&["a", "b", "c"]),
            &[GroupUpdateOperation::insert_peers(["a", "d"])],
        )
        .unwrap();
        assert_eq!(updated.peers, ids(&["b", "c", "a", "d"]));
    }

    #[test]
    fn insert_collapses_repeated_values() {
        let updated = apply_operations(
            &group(&["b"]),
            &[GroupUpdateOperation::insert_peers(["a", "a", "b", "a"])],
        )
        .unwrap();
        assert_eq!(updated.peers, ids(&["a", "b"]));
    }

    #[test]
    fn remove_ignores_absent_peers() {
        let updated = apply_operations(
            &group(&["a"]),
            &[GroupUpdateOperation::remove_peers(["x"])],
        )
        .unwrap();
        assert_eq!(updated.peers, ids(&["a"]));
    }

    #[test]
    fn replace_is_verbatim() {
        let updated = apply_operations(
            &group(&["a"]),
            &[GroupUpdateOperation::replace_peers(["x", "x", "y"])],
        )
        .unwrap();
        assert_eq!(updated.peers, ids(&["x", "x", "y"]));
    }

    #[test]
    fn rename_sets_first_value() {
        let updated =
            apply_operations(&group(&[]), &[GroupUpdateOperation::rename("Ops")]).unwrap();
        assert_eq!(updated.name, "Ops");
    }

    #[test]
    fn rename_without_value_fails_and_leaves_original() {
        let original = group(&["a"]);
        let bad = GroupUpdateOperation {
            kind: GroupUpdateOperationType::RenameGroup,
            values: vec![],
        };
        let err = apply_operations(
            &original,
            &[GroupUpdateOperation::insert_peers(["b"]), bad],
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { .. }));
        assert_eq!(original.peers, ids(&["a"]));
    }
}
