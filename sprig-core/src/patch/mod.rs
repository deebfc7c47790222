//! Patcher
//!
//! Applies a change list to the host, one change at a time, in order.
//!
//! # Overview
//!
//! - [`Host`] is the render surface. The engine writes to it through opaque
//!   [`HostId`] handles and never reads it back.
//! - [`Patcher`] turns [`Change`](crate::diff::Change)s into host calls and
//!   keeps every next-tree node pointing at its host node.
//! - Lifecycle tasks found along the way are queued in a [`LifecycleQueue`]
//!   and run only when the whole pass is done: every `onunmount` first, then
//!   every `onmount`.
//! - Keyed lists are repositioned according to a [`SortStrategy`].
//!
//! [`MemoryHost`] is an in-memory host that records what it was asked to do.

mod host;
mod lifecycle;
mod memory;
mod patcher;
mod sort;

pub use host::{Host, HostId, HostRef};
pub use lifecycle::LifecycleQueue;
pub use memory::{HostOp, MemoryHost};
pub use patcher::{PatchStats, Patcher};
pub use sort::{ItemMove, SortStrategy};
