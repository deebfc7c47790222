//! Virtual Nodes
//!
//! This module defines the node type the differ and patcher operate on.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::attrs::{AttrValue, Attrs, Callback, KEY, ON_UNMOUNT};
use crate::error::{ReconcileError, Result};
use crate::patch::HostRef;

/// The kind of a virtual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A tagged element with attributes and children.
    Element,

    /// A literal string. Has no attributes and no children.
    Text,

    /// An ordered group of keyed siblings, diffed by identity instead of
    /// position. A keylist has no host node of its own: its items are
    /// children of the enclosing element.
    Keylist,
}

#[derive(Debug)]
enum Body {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<VNode>,
    },
    Text(String),
    Keylist(Vec<VNode>),
}

struct Inner {
    body: Body,

    /// Identity among keylist siblings, captured from the `key` attribute.
    key: Option<String>,

    /// The host node this vnode reflects, once built or transferred.
    host: Mutex<Option<HostRef>>,
}

/// One node of a UI tree snapshot.
///
/// A `VNode` is a shared handle: cloning it is cheap and the clone refers to
/// the same node, host reference included. Trees are never edited in place;
/// every render or update builds a new tree.
#[derive(Clone)]
pub struct VNode(Arc<Inner>);

impl VNode {
    fn from_body(body: Body) -> Self {
        let key = match &body {
            Body::Element { attrs, .. } => attrs
                .get(KEY)
                .and_then(AttrValue::as_text)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            _ => None,
        };

        Self(Arc::new(Inner {
            body,
            key,
            host: Mutex::new(None),
        }))
    }

    /// Create an element node.
    pub fn element(tag: impl Into<String>, attrs: Attrs, children: Vec<VNode>) -> Self {
        Self::from_body(Body::Element {
            tag: tag.into(),
            attrs,
            children,
        })
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_body(Body::Text(text.into()))
    }

    /// Create a keylist from already-built items.
    pub fn keylist(items: Vec<VNode>) -> Self {
        Self::from_body(Body::Keylist(items))
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        match self.0.body {
            Body::Element { .. } => NodeKind::Element,
            Body::Text(_) => NodeKind::Text,
            Body::Keylist(_) => NodeKind::Keylist,
        }
    }

    /// The element tag, for elements.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.body {
            Body::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// The attribute mapping, for elements.
    pub fn attrs(&self) -> Option<&Attrs> {
        match &self.0.body {
            Body::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Look up a single attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs().and_then(|attrs| attrs.get(name))
    }

    /// Child nodes. Empty for text nodes.
    pub fn children(&self) -> &[VNode] {
        match &self.0.body {
            Body::Element { children, .. } | Body::Keylist(children) => children,
            Body::Text(_) => &[],
        }
    }

    /// The literal payload, for text nodes.
    pub fn text_content(&self) -> Option<&str> {
        match &self.0.body {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The non-empty string `key`, if any.
    pub fn key(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    /// The host node this vnode currently reflects.
    pub fn host(&self) -> Option<HostRef> {
        *self.0.host.lock()
    }

    pub(crate) fn set_host(&self, host: HostRef) {
        *self.0.host.lock() = Some(host);
    }

    /// Hand this node's host reference to its successor.
    ///
    /// The reference is copied rather than taken: later changes of the same
    /// pass may still address the host node through `self`. The previous
    /// tree is dropped once the pass completes.
    pub(crate) fn transfer_to(&self, next: &VNode) -> Result<()> {
        let host = self.host().ok_or(ReconcileError::Detached {
            what: "transfer source",
        })?;
        next.set_host(host);
        Ok(())
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &VNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The first host node this subtree occupies in its parent.
    ///
    /// For elements and text this is the node itself; for a keylist it is
    /// the first item that has been built.
    pub fn first_host(&self) -> Option<HostRef> {
        match self.kind() {
            NodeKind::Keylist => self.children().iter().find_map(VNode::first_host),
            _ => self.host(),
        }
    }

    /// Check that every keylist in this tree has keyed children.
    pub fn validate_keys(&self) -> Result<()> {
        if self.kind() == NodeKind::Keylist {
            if let Some(index) = self.children().iter().position(|item| item.key().is_none()) {
                return Err(ReconcileError::MissingKey { index });
            }
        }
        self.children().iter().try_for_each(VNode::validate_keys)
    }

    /// Collect every `onunmount` task of this subtree, parents before children.
    pub(crate) fn collect_unmount_tasks(&self, tasks: &mut Vec<Callback>) {
        if let Some(task) = self.attr(ON_UNMOUNT).and_then(AttrValue::as_callback) {
            tasks.push(task.clone());
        }
        for child in self.children() {
            child.collect_unmount_tasks(tasks);
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.body {
            Body::Element {
                tag,
                attrs,
                children,
            } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attrs", attrs)
                .field("children", children)
                .field("host", &self.host())
                .finish(),
            Body::Text(text) => f
                .debug_struct("Text")
                .field("text", text)
                .field("host", &self.host())
                .finish(),
            Body::Keylist(items) => f.debug_tuple("Keylist").field(items).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::HostId;
    use crate::vtree::attrs;

    fn keyed(key: &str) -> VNode {
        VNode::element("li", attrs([("key", key)]), Vec::new())
    }

    #[test]
    fn kinds_and_accessors() {
        let text = VNode::text("hello");
        assert_eq!(text.kind(), NodeKind::Text);
        assert_eq!(text.text_content(), Some("hello"));
        assert!(text.tag().is_none());
        assert!(text.children().is_empty());

        let element = VNode::element("div", attrs([("id", "foo")]), vec![text]);
        assert_eq!(element.kind(), NodeKind::Element);
        assert_eq!(element.tag(), Some("div"));
        assert_eq!(element.attr("id").and_then(AttrValue::as_text), Some("foo"));
        assert_eq!(element.children().len(), 1);
    }

    #[test]
    fn key_requires_non_empty_text() {
        assert_eq!(keyed("a").key(), Some("a"));
        assert_eq!(keyed("").key(), None);

        let flagged = VNode::element("li", attrs([("key", true)]), Vec::new());
        assert_eq!(flagged.key(), None);
    }

    #[test]
    fn clones_share_host_reference() {
        let node = VNode::text("x");
        let clone = node.clone();
        let host = HostRef {
            node: HostId::from_raw(7),
            parent: HostId::from_raw(1),
        };

        node.set_host(host);
        assert_eq!(clone.host(), Some(host));
        assert!(node.ptr_eq(&clone));
    }

    #[test]
    fn transfer_copies_reference_forward() {
        let prev = VNode::text("x");
        let next = VNode::text("x");
        assert!(prev.transfer_to(&next).is_err());

        let host = HostRef {
            node: HostId::from_raw(3),
            parent: HostId::from_raw(1),
        };
        prev.set_host(host);
        prev.transfer_to(&next).unwrap();
        assert_eq!(next.host(), Some(host));
        assert_eq!(prev.host(), Some(host));
    }

    #[test]
    fn validate_keys_finds_unkeyed_items() {
        let good = VNode::element("ul", Attrs::new(), vec![VNode::keylist(vec![keyed("a"), keyed("b")])]);
        assert!(good.validate_keys().is_ok());

        let bad = VNode::element(
            "ul",
            Attrs::new(),
            vec![VNode::keylist(vec![
                keyed("a"),
                VNode::element("li", Attrs::new(), Vec::new()),
            ])],
        );
        match bad.validate_keys() {
            Err(ReconcileError::MissingKey { index }) => assert_eq!(index, 1),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn unmount_tasks_collected_parent_first() {
        use std::sync::Arc;
        use parking_lot::Mutex;

        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = |name: &'static str| {
            let log = log.clone();
            Callback::new(move || log.lock().push(name))
        };

        let tree = VNode::element(
            "div",
            attrs([(ON_UNMOUNT, hook("outer"))]),
            vec![VNode::element("span", attrs([(ON_UNMOUNT, hook("inner"))]), Vec::new())],
        );

        let mut tasks = Vec::new();
        tree.collect_unmount_tasks(&mut tasks);
        tasks.iter().for_each(Callback::call);
        assert_eq!(*log.lock(), vec!["outer", "inner"]);
    }
}
