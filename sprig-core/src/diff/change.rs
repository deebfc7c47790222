//! The change-list model.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::patch::HostRef;
use crate::vtree::{AttrValue, VNode};

/// The kind of a host mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    AddNode,
    RemoveNode,
    ReplaceNode,
    AddAttr,
    RemoveAttr,
    ReplaceAttr,
    Transfer,
    Sort,
}

impl ChangeKind {
    /// Whether this kind changes the shape of the host tree.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ChangeKind::AddNode | ChangeKind::RemoveNode | ChangeKind::ReplaceNode
        )
    }

    /// Whether this kind touches an attribute.
    pub fn is_attr(self) -> bool {
        matches!(
            self,
            ChangeKind::AddAttr | ChangeKind::RemoveAttr | ChangeKind::ReplaceAttr
        )
    }
}

/// Where a node sits in its host parent, for changes that cannot derive it
/// from the node itself (keylists own no host node).
#[derive(Debug, Clone, Default)]
pub struct Placement {
    /// The enclosing element in the previous tree.
    pub parent: Option<VNode>,

    /// The siblings after the node in the previous tree, nearest first.
    pub following: Vec<VNode>,
}

impl Placement {
    /// The host node new content goes in front of: the first following
    /// sibling that occupies one. `None` means append.
    ///
    /// Empty keylists occupy nothing and are skipped.
    pub fn anchor(&self) -> Option<HostRef> {
        self.following.iter().find_map(VNode::first_host)
    }
}

/// Bookkeeping for repositioning a keylist.
#[derive(Debug, Clone, Default)]
pub struct SortPlan {
    /// Key -> (index in prev list, index in next list), in prev scan order.
    pub matches: IndexMap<String, (usize, usize)>,

    /// Keys present only in the next list. Built during the sort itself.
    pub additions: IndexSet<String>,

    /// Prev indexes of removed items, ascending.
    pub removal_indexes: SmallVec<[usize; 8]>,

    /// Where the keylist sits in its host parent.
    pub placement: Placement,
}

impl SortPlan {
    /// Number of removed items that sat before `old_index` in the prev list.
    pub fn removals_before(&self, old_index: usize) -> usize {
        self.removal_indexes.partition_point(|&removed| removed < old_index)
    }

    /// The recorded match for the next-list item at `new_index`, if its key
    /// was matched to exactly that position.
    pub fn match_at(&self, key: Option<&str>, new_index: usize) -> Option<(usize, usize)> {
        key.and_then(|key| self.matches.get(key))
            .copied()
            .filter(|&(_, matched)| matched == new_index)
    }
}

/// One host mutation, in the order the differ emits it.
#[derive(Debug, Clone)]
pub enum Change {
    /// Build `next` and append it to the host node of `parent`.
    AddNode { parent: VNode, next: VNode },

    /// Detach `prev` (the whole subtree) from the host.
    RemoveNode { prev: VNode },

    /// Build `next` and put it where `prev` was.
    ReplaceNode {
        prev: VNode,
        next: VNode,
        placement: Placement,
    },

    AddAttr {
        prev: VNode,
        next: VNode,
        name: String,
        value: AttrValue,
    },

    /// Carries the value being removed, so the patcher knows whether it was
    /// a property or an attribute.
    RemoveAttr {
        prev: VNode,
        next: VNode,
        name: String,
        value: AttrValue,
    },

    ReplaceAttr {
        prev: VNode,
        next: VNode,
        name: String,
        value: AttrValue,
    },

    /// Reuse `prev`'s host node for `next` without touching the host.
    Transfer { prev: VNode, next: VNode },

    /// Reposition and complete a keylist.
    Sort {
        prev: VNode,
        next: VNode,
        plan: SortPlan,
    },
}

impl Change {
    /// Get the change's kind.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::AddNode { .. } => ChangeKind::AddNode,
            Change::RemoveNode { .. } => ChangeKind::RemoveNode,
            Change::ReplaceNode { .. } => ChangeKind::ReplaceNode,
            Change::AddAttr { .. } => ChangeKind::AddAttr,
            Change::RemoveAttr { .. } => ChangeKind::RemoveAttr,
            Change::ReplaceAttr { .. } => ChangeKind::ReplaceAttr,
            Change::Transfer { .. } => ChangeKind::Transfer,
            Change::Sort { .. } => ChangeKind::Sort,
        }
    }

    /// The node being migrated away from, if any.
    pub fn prev(&self) -> Option<&VNode> {
        match self {
            Change::AddNode { .. } => None,
            Change::RemoveNode { prev }
            | Change::ReplaceNode { prev, .. }
            | Change::AddAttr { prev, .. }
            | Change::RemoveAttr { prev, .. }
            | Change::ReplaceAttr { prev, .. }
            | Change::Transfer { prev, .. }
            | Change::Sort { prev, .. } => Some(prev),
        }
    }

    /// The node being migrated to, if any.
    pub fn next(&self) -> Option<&VNode> {
        match self {
            Change::RemoveNode { .. } => None,
            Change::AddNode { next, .. }
            | Change::ReplaceNode { next, .. }
            | Change::AddAttr { next, .. }
            | Change::RemoveAttr { next, .. }
            | Change::ReplaceAttr { next, .. }
            | Change::Transfer { next, .. }
            | Change::Sort { next, .. } => Some(next),
        }
    }

    /// The attribute name, for attribute changes.
    pub fn attr_name(&self) -> Option<&str> {
        match self {
            Change::AddAttr { name, .. }
            | Change::RemoveAttr { name, .. }
            | Change::ReplaceAttr { name, .. } => Some(name),
            _ => None,
        }
    }
}
