//! Positional child diff.
//!
//! Unkeyed siblings are matched by index only. Inserting or removing in the
//! middle of such a list makes every following sibling look changed; keyed
//! lists exist to avoid exactly that.

use super::change::Change;
use super::compare::{compare_to, Position};
use crate::error::Result;
use crate::vtree::VNode;

/// Append the changes that migrate `prev`'s children to `next`'s.
///
/// The common prefix is compared pairwise. A longer `next` appends its tail
/// to `prev`'s host node; a longer `prev` has its tail removed whole.
pub(crate) fn compare_children(prev: &VNode, next: &VNode, changes: &mut Vec<Change>) -> Result<()> {
    let prev_children = prev.children();
    let next_children = next.children();
    let common = prev_children.len().min(next_children.len());

    for (index, (prev_child, next_child)) in prev_children
        .iter()
        .zip(next_children)
        .enumerate()
    {
        let position = Position {
            parent: Some(prev),
            following: &prev_children[index + 1..],
        };
        compare_to(prev_child, next_child, position, changes)?;
    }

    for added in &next_children[common..] {
        changes.push(Change::AddNode {
            parent: prev.clone(),
            next: added.clone(),
        });
    }

    for removed in &prev_children[common..] {
        changes.push(Change::RemoveNode {
            prev: removed.clone(),
        });
    }

    Ok(())
}
