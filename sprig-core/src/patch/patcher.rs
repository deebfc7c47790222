//! Change application.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use super::host::{Host, HostId, HostRef};
use super::lifecycle::LifecycleQueue;
use super::sort::ItemMove;
use crate::config::ReconcilerConfig;
use crate::diff::{Change, ChangeKind, Placement, SortPlan};
use crate::error::{ReconcileError, Result};
use crate::vtree::{AttrValue, NodeKind, VNode, KEY, ON_MOUNT};

/// Counters describing what one or more passes did to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchStats {
    /// Applied changes, by kind.
    pub changes: BTreeMap<ChangeKind, usize>,
    /// Host nodes created (elements and text).
    pub nodes_built: usize,
    /// Matched keylist items re-inserted by a `Sort`.
    pub moves: usize,
}

impl PatchStats {
    /// Count of applied changes of one kind.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.get(&kind).copied().unwrap_or(0)
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &PatchStats) {
        for (kind, count) in &other.changes {
            *self.changes.entry(*kind).or_default() += count;
        }
        self.nodes_built += other.nodes_built;
        self.moves += other.moves;
    }
}

/// Applies change lists to a host and collects lifecycle tasks.
///
/// A patcher lives for one pass. Call [`Patcher::finish`] to get the
/// collected tasks; running them is the caller's job, so that they can run
/// after any locks around the host are released.
pub struct Patcher<'a, H: Host + ?Sized> {
    host: &'a mut H,
    config: &'a ReconcilerConfig,
    lifecycle: LifecycleQueue,
    stats: PatchStats,
    /// Host parent of the tree's root.
    root: Option<HostId>,
}

impl<'a, H: Host + ?Sized> Patcher<'a, H> {
    pub fn new(host: &'a mut H, config: &'a ReconcilerConfig) -> Self {
        Self {
            host,
            config,
            lifecycle: LifecycleQueue::new(),
            stats: PatchStats::default(),
            root: None,
        }
    }

    /// Set the host node the tree is mounted into.
    ///
    /// Needed when the root of the tree is a keylist: with no items left it
    /// has nothing else to find its host parent through.
    pub fn with_root(mut self, root: HostId) -> Self {
        self.root = Some(root);
        self
    }

    /// Build `tree` from scratch and append it to `target`.
    pub fn mount(&mut self, tree: &VNode, target: HostId) {
        self.root = Some(target);
        self.build(tree, target, None);
    }

    /// Apply `changes` in order.
    ///
    /// Every host node the changes refer to is looked up before the first
    /// write, so a change list built against an unbuilt tree fails with
    /// `Detached` and leaves the host as it was.
    pub fn apply(&mut self, changes: &[Change]) -> Result<()> {
        self.check(changes)?;
        for change in changes {
            trace!(kind = ?change.kind(), "applying change");
            self.apply_one(change)?;
            *self.stats.changes.entry(change.kind()).or_default() += 1;
        }
        Ok(())
    }

    /// End the pass, handing back the collected lifecycle tasks.
    pub fn finish(self) -> (LifecycleQueue, PatchStats) {
        (self.lifecycle, self.stats)
    }

    fn check(&self, changes: &[Change]) -> Result<()> {
        for change in changes {
            match change {
                Change::AddNode { parent, .. } => {
                    parent.host().ok_or(ReconcileError::Detached {
                        what: "parent of an added node",
                    })?;
                }
                Change::RemoveNode { prev } => check_attached(prev)?,
                Change::ReplaceNode { prev, placement, .. } => {
                    self.resolve_parent(prev, placement)?;
                    check_attached(prev)?;
                }
                Change::AddAttr { prev, .. }
                | Change::RemoveAttr { prev, .. }
                | Change::ReplaceAttr { prev, .. } => {
                    attr_target(prev)?;
                }
                Change::Transfer { prev, .. } => {
                    prev.host().ok_or(ReconcileError::Detached {
                        what: "transfer source",
                    })?;
                }
                Change::Sort { prev, plan, .. } => {
                    self.resolve_parent(prev, &plan.placement)?;
                    for &(old_index, _) in plan.matches.values() {
                        if let Some(item) = prev.children().get(old_index) {
                            check_attached(item)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_one(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::AddNode { parent, next } => {
                let parent = parent.host().ok_or(ReconcileError::Detached {
                    what: "parent of an added node",
                })?;
                self.build(next, parent.node, None);
            }
            Change::RemoveNode { prev } => {
                self.detach(prev)?;
                self.collect_unmounts(prev);
            }
            Change::ReplaceNode {
                prev,
                next,
                placement,
            } => {
                self.replace(prev, next, placement)?;
                self.collect_unmounts(prev);
            }
            Change::AddAttr {
                prev,
                next,
                name,
                value,
            }
            | Change::ReplaceAttr {
                prev,
                next,
                name,
                value,
            } => {
                let node = attr_target(prev)?;
                self.write_attr(node, name, value);
                prev.transfer_to(next)?;
            }
            Change::RemoveAttr {
                prev,
                next,
                name,
                value,
            } => {
                let node = attr_target(prev)?;
                self.clear_attr(node, name, value);
                prev.transfer_to(next)?;
            }
            Change::Transfer { prev, next } => prev.transfer_to(next)?,
            Change::Sort { prev, next, plan } => self.sort(prev, next, plan)?,
        }
        Ok(())
    }

    fn collect_unmounts(&mut self, prev: &VNode) {
        let mut tasks = Vec::new();
        prev.collect_unmount_tasks(&mut tasks);
        for task in tasks {
            self.lifecycle.push_unmount(task);
        }
    }

    /// Insert `node` before `before`, or append it.
    fn place(&mut self, parent: HostId, node: HostId, before: Option<HostId>) {
        match before {
            Some(reference) => self.host.insert_before(parent, node, reference),
            None => self.host.append_child(parent, node),
        }
    }

    /// Build a subtree and insert it into `parent`.
    fn build(&mut self, node: &VNode, parent: HostId, before: Option<HostId>) {
        match node.kind() {
            NodeKind::Keylist => {
                // Items go straight into the enclosing element, in order.
                for item in node.children() {
                    self.build(item, parent, before);
                }
            }
            NodeKind::Element | NodeKind::Text => {
                let id = self.materialize(node, parent);
                self.place(parent, id, before);
            }
        }
    }

    /// Create the host node for an element or text vnode, with its whole
    /// subtree, without attaching it.
    fn materialize(&mut self, node: &VNode, parent: HostId) -> HostId {
        self.stats.nodes_built += 1;

        let id = match (node.tag(), node.text_content()) {
            (Some(tag), _) => {
                let id = self.host.create_element(tag);
                if let Some(attrs) = node.attrs() {
                    for (name, value) in attrs.iter().filter(|(name, _)| name.as_str() != KEY) {
                        self.write_attr(id, name, value);
                    }
                }
                for child in node.children() {
                    self.build(child, id, None);
                }
                id
            }
            (None, text) => self.host.create_text_node(text.unwrap_or_default()),
        };

        node.set_host(HostRef { node: id, parent });

        // Children were built first, so their mount tasks run first.
        if let Some(task) = node.attr(ON_MOUNT).and_then(AttrValue::as_callback) {
            self.lifecycle.push_mount(task.clone());
        }

        id
    }

    /// Remove a subtree's host nodes from their parent.
    fn detach(&mut self, node: &VNode) -> Result<()> {
        match node.kind() {
            NodeKind::Keylist => {
                for item in node.children() {
                    self.detach(item)?;
                }
            }
            NodeKind::Element | NodeKind::Text => {
                let host = node.host().ok_or(ReconcileError::Detached {
                    what: "removed node",
                })?;
                self.host.remove_child(host.parent, host.node);
            }
        }
        Ok(())
    }

    fn replace(&mut self, prev: &VNode, next: &VNode, placement: &Placement) -> Result<()> {
        let parent = self.resolve_parent(prev, placement)?;

        match (prev.host(), next.kind()) {
            (Some(old), NodeKind::Element | NodeKind::Text) => {
                let id = self.materialize(next, parent);
                self.host.replace_child(parent, id, old.node);
            }
            _ => {
                // A keylist is on one side: build the new content in front of
                // the old, then take the old out.
                let before = prev
                    .first_host()
                    .or_else(|| placement.anchor())
                    .map(|host| host.node);
                self.build(next, parent, before);
                self.detach(prev)?;
            }
        }
        Ok(())
    }

    fn write_attr(&mut self, node: HostId, name: &str, value: &AttrValue) {
        match value {
            AttrValue::Callback(_) => {
                self.host.assign_property(node, name, Some(value));
                return;
            }
            AttrValue::Text(text) => self.host.set_attribute(node, name, text),
            AttrValue::Bool(true) => self.host.set_attribute(node, name, ""),
            AttrValue::Bool(false) => self.host.remove_attribute(node, name),
        }
        if self.config.is_live_property(name) {
            self.host.assign_property(node, name, Some(value));
        }
    }

    fn clear_attr(&mut self, node: HostId, name: &str, value: &AttrValue) {
        if value.is_callback() {
            self.host.assign_property(node, name, None);
            return;
        }
        self.host.remove_attribute(node, name);
        if self.config.is_live_property(name) {
            self.host.assign_property(node, name, None);
        }
    }

    /// Reposition a keylist's items and build its additions.
    fn sort(&mut self, prev: &VNode, next: &VNode, plan: &SortPlan) -> Result<()> {
        let parent = self.resolve_parent(prev, &plan.placement)?;
        let items = next.children();
        let prev_len = prev.children().len();
        let strategy = self.config.sort_strategy;

        let mut additions_remaining = plan.additions.len();
        let mut next_sibling = plan.placement.anchor().map(|host| host.node);

        for (new_index, item) in items.iter().enumerate().rev() {
            let node = match plan.match_at(item.key(), new_index) {
                Some((old_index, _)) => {
                    let node = item
                        .host()
                        .ok_or(ReconcileError::Detached {
                            what: "matched keylist item",
                        })?
                        .node;
                    let movement = ItemMove {
                        old_index,
                        new_index,
                        prev_len,
                        next_len: items.len(),
                        additions_remaining,
                        removals_before: plan.removals_before(old_index),
                    };
                    if strategy.needs_reposition(&movement) {
                        self.place(parent, node, next_sibling);
                        self.stats.moves += 1;
                    }
                    node
                }
                None => {
                    let node = self.materialize(item, parent);
                    self.place(parent, node, next_sibling);
                    additions_remaining = additions_remaining.saturating_sub(1);
                    node
                }
            };
            next_sibling = Some(node);
        }

        Ok(())
    }

    /// The host parent of `prev`'s content.
    ///
    /// Elements and text record it. A keylist borrows it from its first item
    /// or, when it has none, from the enclosing element (the mount root when
    /// the keylist is the root of the tree).
    fn resolve_parent(&self, prev: &VNode, placement: &Placement) -> Result<HostId> {
        if let Some(host) = prev
            .host()
            .or_else(|| prev.children().iter().find_map(VNode::host))
        {
            return Ok(host.parent);
        }

        let parent = match &placement.parent {
            Some(parent) => parent.host().map(|host| host.node),
            None => self.root,
        };
        parent.ok_or(ReconcileError::Detached {
            what: "host parent",
        })
    }
}

fn attr_target(prev: &VNode) -> Result<HostId> {
    prev.host()
        .map(|host| host.node)
        .ok_or(ReconcileError::Detached {
            what: "attribute target",
        })
}

/// Fail unless every host node `node` occupies is known.
fn check_attached(node: &VNode) -> Result<()> {
    match node.kind() {
        NodeKind::Keylist => node.children().iter().try_for_each(check_attached),
        NodeKind::Element | NodeKind::Text => node
            .host()
            .map(|_| ())
            .ok_or(ReconcileError::Detached {
                what: "removed node",
            }),
    }
}
