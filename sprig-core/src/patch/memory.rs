//! In-memory host.
//!
//! [`MemoryHost`] is a small document model that implements [`Host`] and
//! logs every primitive call. It lets the engine run headless and lets
//! tests assert both the resulting tree and how many host operations it
//! took to get there.

use std::collections::HashMap;
use std::fmt::Write;

use indexmap::IndexMap;

use super::host::{Host, HostId};
use crate::vtree::AttrValue;

/// One recorded host primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { node: HostId, tag: String },
    CreateText { node: HostId, text: String },
    SetAttribute { node: HostId, name: String, value: String },
    RemoveAttribute { node: HostId, name: String },
    AssignProperty { node: HostId, name: String, cleared: bool },
    AppendChild { parent: HostId, child: HostId },
    RemoveChild { parent: HostId, child: HostId },
    ReplaceChild { parent: HostId, new_child: HostId, old_child: HostId },
    InsertBefore { parent: HostId, new_child: HostId, reference: HostId },
}

impl HostOp {
    /// Whether this op attaches a node under a parent.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            HostOp::AppendChild { .. } | HostOp::InsertBefore { .. } | HostOp::ReplaceChild { .. }
        )
    }

    /// Whether this op creates a node.
    pub fn is_creation(&self) -> bool {
        matches!(self, HostOp::CreateElement { .. } | HostOp::CreateText { .. })
    }
}

#[derive(Debug, Default)]
struct MemoryNode {
    tag: Option<String>,
    text: Option<String>,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, AttrValue>,
    children: Vec<HostId>,
    parent: Option<HostId>,
}

/// An in-memory document.
#[derive(Debug)]
pub struct MemoryHost {
    nodes: HashMap<HostId, MemoryNode>,
    next_id: u64,
    ops: Vec<HostOp>,
    ready: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 1,
            ops: Vec::new(),
            ready: true,
        }
    }

    /// A host that reports no usable environment.
    pub fn offline() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    fn allocate(&mut self, node: MemoryNode) -> HostId {
        let id = HostId::from_raw(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Create a detached element to render into. Not logged.
    pub fn create_root(&mut self, tag: &str) -> HostId {
        self.allocate(MemoryNode {
            tag: Some(tag.to_string()),
            ..MemoryNode::default()
        })
    }

    /// Recorded primitive calls, oldest first.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Forget recorded calls.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Number of live nodes, attached or not.
    ///
    /// Subtrees detached by `remove_child` or `replace_child` are dropped
    /// and no longer counted.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, node: HostId) -> &[HostId] {
        self.nodes
            .get(&node)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, node: HostId) -> Option<HostId> {
        self.nodes.get(&node).and_then(|node| node.parent)
    }

    pub fn tag(&self, node: HostId) -> Option<&str> {
        self.nodes.get(&node).and_then(|node| node.tag.as_deref())
    }

    pub fn text(&self, node: HostId) -> Option<&str> {
        self.nodes.get(&node).and_then(|node| node.text.as_deref())
    }

    pub fn attribute(&self, node: HostId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|node| node.attributes.get(name))
            .map(String::as_str)
    }

    pub fn property(&self, node: HostId, name: &str) -> Option<&AttrValue> {
        self.nodes
            .get(&node)
            .and_then(|node| node.properties.get(name))
    }

    /// Serialize a subtree as markup, attributes in write order.
    pub fn to_markup(&self, node: HostId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Serialize the children of `node`, without `node` itself.
    pub fn inner_markup(&self, node: HostId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let Some(text) = &node.text {
            out.push_str(text);
            return;
        }
        let tag = node.tag.as_deref().unwrap_or("?");
        out.push('<');
        out.push_str(tag);
        for (name, value) in &node.attributes {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        out.push('>');
        for &child in &node.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{tag}>");
    }

    fn detach(&mut self, child: HostId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&existing| existing != child);
        }
    }

    fn attach_at(&mut self, parent: HostId, child: HostId, index: Option<usize>) {
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&parent) {
            let index = index.unwrap_or(node.children.len()).min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
    }

    /// Drop a detached node and everything below it.
    fn forget(&mut self, id: HostId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                stack.extend(node.children);
            }
        }
    }

    fn index_of(&self, parent: HostId, child: HostId) -> Option<usize> {
        self.children(parent).iter().position(|&existing| existing == child)
    }
}

impl Host for MemoryHost {
    fn environment_ready(&self) -> bool {
        self.ready
    }

    fn create_element(&mut self, tag: &str) -> HostId {
        let node = self.allocate(MemoryNode {
            tag: Some(tag.to_string()),
            ..MemoryNode::default()
        });
        self.ops.push(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text_node(&mut self, text: &str) -> HostId {
        let node = self.allocate(MemoryNode {
            text: Some(text.to_string()),
            ..MemoryNode::default()
        });
        self.ops.push(HostOp::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn set_attribute(&mut self, node: HostId, name: &str, value: &str) {
        if let Some(target) = self.nodes.get_mut(&node) {
            target.attributes.insert(name.to_string(), value.to_string());
        }
        self.ops.push(HostOp::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: HostId, name: &str) {
        if let Some(target) = self.nodes.get_mut(&node) {
            target.attributes.shift_remove(name);
        }
        self.ops.push(HostOp::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    fn assign_property(&mut self, node: HostId, name: &str, value: Option<&AttrValue>) {
        if let Some(target) = self.nodes.get_mut(&node) {
            match value {
                Some(value) => {
                    target.properties.insert(name.to_string(), value.clone());
                }
                None => {
                    target.properties.shift_remove(name);
                }
            }
        }
        self.ops.push(HostOp::AssignProperty {
            node,
            name: name.to_string(),
            cleared: value.is_none(),
        });
    }

    fn append_child(&mut self, parent: HostId, child: HostId) {
        self.attach_at(parent, child, None);
        self.ops.push(HostOp::AppendChild { parent, child });
    }

    fn remove_child(&mut self, parent: HostId, child: HostId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
            self.forget(child);
        }
        self.ops.push(HostOp::RemoveChild { parent, child });
    }

    fn replace_child(&mut self, parent: HostId, new_child: HostId, old_child: HostId) {
        let index = self.index_of(parent, old_child);
        self.detach(old_child);
        self.attach_at(parent, new_child, index);
        if index.is_some() && old_child != new_child {
            self.forget(old_child);
        }
        self.ops.push(HostOp::ReplaceChild {
            parent,
            new_child,
            old_child,
        });
    }

    fn insert_before(&mut self, parent: HostId, new_child: HostId, reference: HostId) {
        // Detach first so the reference index accounts for a node moving
        // within the same parent.
        self.detach(new_child);
        let index = self.index_of(parent, reference);
        self.attach_at(parent, new_child, index);
        self.ops.push(HostOp::InsertBefore {
            parent,
            new_child,
            reference,
        });
    }
}
