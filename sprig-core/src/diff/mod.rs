//! Differ
//!
//! The differ compares two virtual trees and produces the ordered list of
//! [`Change`]s that migrates the host from the first to the second. It is
//! pure: it never touches the host and never reads host state. Host nodes
//! are referred to through the vnodes that own them, and resolved only when
//! the patcher applies the change.
//!
//! # Rules
//!
//! 1. Nodes of a different tag (or kind) are replaced wholesale.
//! 2. Equal text nodes transfer their host node; unequal ones are replaced.
//! 3. Keylists are matched by key, with a single `Sort` to reposition them.
//! 4. Elements of the same tag diff their attributes, then their children,
//!    and transfer their host node if no attribute changed.
//!
//! # Ordering
//!
//! The output order is part of the contract. An element's attribute changes
//! come before any change to its children, and each of them carries the
//! element's host reference forward. A keylist's `Sort` comes after every
//! change to its matched items, so they all have host nodes by then. Apply
//! changes in the order they are returned.

mod attrs;
mod change;
mod children;
mod compare;
mod keylist;

pub use change::{Change, ChangeKind, Placement, SortPlan};

use tracing::trace;

use crate::error::Result;
use crate::vtree::VNode;

/// Compute the changes that migrate `prev` to `next`.
///
/// Fails with `MissingKey` if any compared keylist has an unkeyed item; no
/// changes are returned in that case, so nothing can be partially applied.
pub fn diff(prev: &VNode, next: &VNode) -> Result<Vec<Change>> {
    let mut changes = Vec::new();
    compare::compare_to(prev, next, compare::Position::default(), &mut changes)?;
    trace!(changes = changes.len(), "diff complete");
    Ok(changes)
}
