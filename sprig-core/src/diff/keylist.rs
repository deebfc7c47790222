//! Keyed-list diff.
//!
//! Items are matched by key instead of position:
//!
//! 1. Every item on both sides must carry a key; otherwise the diff fails
//!    before emitting anything.
//! 2. Prev items without a match are removed (their prev index recorded);
//!    matched pairs are diffed recursively, in prev order.
//! 3. Next items without a match become additions. They are not emitted as
//!    `AddNode`: the `Sort` builds them in place.
//! 4. A single `Sort` is emitted only if the matched items changed relative
//!    order or something was added.

use std::collections::HashMap;

use super::change::{Change, SortPlan};
use super::compare::{compare_to, Position};
use crate::error::{ReconcileError, Result};
use crate::vtree::VNode;

fn keys_of(items: &[VNode]) -> Result<Vec<&str>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| item.key().ok_or(ReconcileError::MissingKey { index }))
        .collect()
}

/// Append the changes that migrate keylist `prev` to keylist `next`.
pub(crate) fn compare_keylist(
    prev: &VNode,
    next: &VNode,
    position: Position<'_>,
    changes: &mut Vec<Change>,
) -> Result<()> {
    let prev_items = prev.children();
    let next_items = next.children();
    let prev_keys = keys_of(prev_items)?;
    let next_keys = keys_of(next_items)?;

    // First occurrence wins on the next side.
    let mut next_index: HashMap<&str, usize> = HashMap::with_capacity(next_keys.len());
    for (j, key) in next_keys.iter().enumerate() {
        next_index.entry(*key).or_insert(j);
    }

    let mut plan = SortPlan::default();
    let mut in_order = true;
    let mut last_matched: Option<usize> = None;
    let item_position = Position {
        parent: position.parent,
        following: &[],
    };

    for (i, key) in prev_keys.iter().enumerate() {
        // A later duplicate on the prev side finds its key taken and is removed.
        let matched = next_index
            .get(key)
            .copied()
            .filter(|_| !plan.matches.contains_key(*key));

        match matched {
            Some(j) => {
                if last_matched.is_some_and(|last| j < last) {
                    in_order = false;
                }
                last_matched = Some(j);
                plan.matches.insert(key.to_string(), (i, j));
                compare_to(&prev_items[i], &next_items[j], item_position, changes)?;
            }
            None => {
                changes.push(Change::RemoveNode {
                    prev: prev_items[i].clone(),
                });
                plan.removal_indexes.push(i);
            }
        }
    }

    for (j, key) in next_keys.iter().enumerate() {
        if plan.match_at(Some(*key), j).is_none() {
            plan.additions.insert(key.to_string());
        }
    }

    if !in_order || !plan.additions.is_empty() {
        plan.placement = position.placement();
        changes.push(Change::Sort {
            prev: prev.clone(),
            next: next.clone(),
            plan,
        });
    }

    Ok(())
}
