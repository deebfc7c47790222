//! Node comparison.

use super::attrs::compare_attrs;
use super::change::{Change, Placement};
use super::children::compare_children;
use super::keylist::compare_keylist;
use crate::error::Result;
use crate::vtree::{NodeKind, VNode};

/// Where the node pair being compared sits in the previous tree.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Position<'a> {
    /// The enclosing element.
    pub parent: Option<&'a VNode>,
    /// The siblings after it, nearest first.
    pub following: &'a [VNode],
}

impl Position<'_> {
    pub(crate) fn placement(&self) -> Placement {
        Placement {
            parent: self.parent.cloned(),
            following: self.following.to_vec(),
        }
    }
}

/// Two nodes are the same "tag" when they are the same kind and, for
/// elements, carry the same tag name.
fn same_tag(prev: &VNode, next: &VNode) -> bool {
    prev.kind() == next.kind() && prev.tag() == next.tag()
}

/// Compare `prev` to `next`, appending the changes that migrate one to the
/// other.
pub(crate) fn compare_to(
    prev: &VNode,
    next: &VNode,
    position: Position<'_>,
    changes: &mut Vec<Change>,
) -> Result<()> {
    // A different tag discards the whole subtree; children are never visited.
    if !same_tag(prev, next) {
        changes.push(Change::ReplaceNode {
            prev: prev.clone(),
            next: next.clone(),
            placement: position.placement(),
        });
        return Ok(());
    }

    match next.kind() {
        NodeKind::Text => {
            if prev.text_content() == next.text_content() {
                changes.push(Change::Transfer {
                    prev: prev.clone(),
                    next: next.clone(),
                });
            } else {
                changes.push(Change::ReplaceNode {
                    prev: prev.clone(),
                    next: next.clone(),
                    placement: position.placement(),
                });
            }
        }
        NodeKind::Keylist => compare_keylist(prev, next, position, changes)?,
        NodeKind::Element => {
            let attr_changes = compare_attrs(prev, next, changes);
            compare_children(prev, next, changes)?;

            // No attribute write means the host element carries over as is.
            if attr_changes == 0 {
                changes.push(Change::Transfer {
                    prev: prev.clone(),
                    next: next.clone(),
                });
            }
        }
    }

    Ok(())
}
