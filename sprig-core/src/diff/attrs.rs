//! Attribute diff.

use super::change::Change;
use crate::vtree::{VNode, KEY};

/// Append the attribute changes between two elements; returns how many were
/// emitted.
///
/// Removals and replacements come first, in `prev` order, then additions in
/// `next` order. Values are compared strictly: text and flags by value,
/// callbacks by identity. `key` is never diffed.
pub(crate) fn compare_attrs(prev: &VNode, next: &VNode, changes: &mut Vec<Change>) -> usize {
    let (Some(prev_attrs), Some(next_attrs)) = (prev.attrs(), next.attrs()) else {
        return 0;
    };
    let before = changes.len();

    for (name, prev_value) in prev_attrs.iter().filter(|(name, _)| name.as_str() != KEY) {
        match next_attrs.get(name) {
            None => changes.push(Change::RemoveAttr {
                prev: prev.clone(),
                next: next.clone(),
                name: name.clone(),
                value: prev_value.clone(),
            }),
            Some(next_value) if next_value != prev_value => changes.push(Change::ReplaceAttr {
                prev: prev.clone(),
                next: next.clone(),
                name: name.clone(),
                value: next_value.clone(),
            }),
            Some(_) => {}
        }
    }

    for (name, next_value) in next_attrs.iter().filter(|(name, _)| name.as_str() != KEY) {
        if !prev_attrs.contains_key(name) {
            changes.push(Change::AddAttr {
                prev: prev.clone(),
                next: next.clone(),
                name: name.clone(),
                value: next_value.clone(),
            });
        }
    }

    changes.len() - before
}
