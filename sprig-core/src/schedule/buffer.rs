//! The two-slot render buffer.

use crate::vtree::VNode;

/// The trees a reconciler is working between.
///
/// `base` is the tree the host reflects (before the first mount: the tree
/// waiting to be mounted). `desired` is the newest requested tree; every
/// update overwrites it, so intermediate requests are never diffed.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffer {
    base: Option<VNode>,
    desired: Option<VNode>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from a single tree.
    pub fn reset(&mut self, tree: VNode) {
        self.base = Some(tree);
        self.desired = None;
    }

    /// Use `tree` as the base, unless one is already recorded.
    pub fn seed(&mut self, tree: &VNode) {
        if self.base.is_none() {
            self.base = Some(tree.clone());
        }
    }

    /// Record the newest requested tree, replacing any unapplied one.
    pub fn request(&mut self, tree: VNode) {
        self.desired = Some(tree);
    }

    pub fn base(&self) -> Option<&VNode> {
        self.base.as_ref()
    }

    pub fn desired(&self) -> Option<&VNode> {
        self.desired.as_ref()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        usize::from(self.base.is_some()) + usize::from(self.desired.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The desired tree has been applied: it becomes the base.
    pub fn collapse(&mut self) {
        if let Some(desired) = self.desired.take() {
            self.base = Some(desired);
        }
    }

    /// Drop the desired tree without applying it.
    pub fn discard(&mut self) -> Option<VNode> {
        self.desired.take()
    }
}
