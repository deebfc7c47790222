//! Tree construction with child coercion.

use super::attrs::Attrs;
use super::node::VNode;

/// Anything that can appear in a child list.
///
/// [`create`] coerces each child: lists become keylists, scalars become
/// text nodes, and empty slots are dropped.
#[derive(Debug, Clone)]
pub enum Child {
    /// An already-built node.
    Node(VNode),
    /// A list of keyed items, wrapped into a keylist.
    List(Vec<VNode>),
    /// A literal, wrapped into a text node.
    Text(String),
    /// Nothing. Ignored.
    Empty,
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<Vec<VNode>> for Child {
    fn from(items: Vec<VNode>) -> Self {
        Child::List(items)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map_or(Child::Empty, Into::into)
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

macro_rules! display_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.to_string())
                }
            }
        )*
    };
}

display_child!(char, bool, i32, i64, u32, u64, usize, f32, f64);

/// Build an element node.
///
/// ```rust,ignore
/// create("div", attrs([("class", "my-class")]), [
///     create("span", Attrs::new(), ["some text here"]).into(),
///     Child::from(vec![create("li", attrs([("key", "a")]), ["a"])]),
/// ])
/// ```
pub fn create<I, C>(tag: &str, attrs: Attrs, children: I) -> VNode
where
    I: IntoIterator<Item = C>,
    C: Into<Child>,
{
    let children = children
        .into_iter()
        .filter_map(|child| match child.into() {
            Child::Node(node) => Some(node),
            Child::List(items) => Some(VNode::keylist(items)),
            Child::Text(text) => Some(VNode::text(text)),
            Child::Empty => None,
        })
        .collect();

    VNode::element(tag, attrs, children)
}

/// Build an element node without children.
pub fn leaf(tag: &str, attrs: Attrs) -> VNode {
    VNode::element(tag, attrs, Vec::new())
}
