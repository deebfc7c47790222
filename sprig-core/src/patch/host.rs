//! Host Collaborator
//!
//! The host is the real render surface: a document-like API able to create,
//! attach and mutate native nodes. The engine only ever writes to it. It
//! never asks the host where a node lives or what it contains; every handle
//! it needs is remembered in the virtual tree.

use crate::vtree::AttrValue;

/// Handle to a native node owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(u64);

impl HostId {
    /// Wrap a raw handle value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for HostId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A built vnode's place in the host: the node itself and its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostRef {
    pub node: HostId,
    pub parent: HostId,
}

/// The primitives the patcher needs from a render surface.
///
/// Methods mirror the DOM: inserting a node that is already attached
/// somewhere moves it.
pub trait Host {
    /// Whether the host can create and mutate nodes at all.
    ///
    /// Checked once, when a reconciler is constructed.
    fn environment_ready(&self) -> bool {
        true
    }

    /// Create a detached element node.
    fn create_element(&mut self, tag: &str) -> HostId;

    /// Create a detached text node.
    fn create_text_node(&mut self, text: &str) -> HostId;

    /// Set a stringified attribute, overwriting any previous value.
    fn set_attribute(&mut self, node: HostId, name: &str, value: &str);

    /// Remove an attribute. Removing a missing one is a no-op.
    fn remove_attribute(&mut self, node: HostId, name: &str);

    /// Assign (`Some`) or clear (`None`) a live property on a node.
    fn assign_property(&mut self, node: HostId, name: &str, value: Option<&AttrValue>);

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostId, child: HostId);

    /// Detach `child` from `parent`. The engine never reuses it afterwards.
    fn remove_child(&mut self, parent: HostId, child: HostId);

    /// Put `new_child` where `old_child` was.
    fn replace_child(&mut self, parent: HostId, new_child: HostId, old_child: HostId);

    /// Insert `new_child` immediately before `reference`.
    fn insert_before(&mut self, parent: HostId, new_child: HostId, reference: HostId);
}
