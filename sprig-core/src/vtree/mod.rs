//! Tree Model
//!
//! A virtual tree is a lightweight, immutable description of a UI tree. The
//! differ compares two of them; the patcher builds one into the host or
//! migrates the host from one to the next.
//!
//! # Node kinds
//!
//! - **Element**: a tag, an ordered attribute map and ordered children.
//! - **Text**: a literal string.
//! - **Keylist**: a group of siblings identified by their `key` attribute
//!   rather than their position. Keylists are created by passing a list as a
//!   child to [`create`].
//!
//! # Host references
//!
//! Every built element or text node records the host node it reflects,
//! together with that node's host parent. The engine never reads the host
//! back; these references are the only way it finds host nodes again.
//!
//! Key validation is deferred to the differ and patcher: a single item cannot
//! know whether its siblings are keyed.

mod attrs;
mod create;
mod node;

pub use attrs::{attrs, AttrValue, Attrs, Callback, KEY, ON_MOUNT, ON_UNMOUNT};
pub use create::{create, leaf, Child};
pub use node::{NodeKind, VNode};
