//! Sprig Core
//!
//! A virtual-tree reconciliation engine. Callers describe the UI they want
//! as a tree of lightweight [`VNode`]s; the engine works out the smallest
//! sequence of mutations that brings a host tree (a DOM, or anything that
//! implements [`Host`]) in line with it.
//!
//! # Architecture
//!
//! - `vtree`: the virtual tree model and its constructor, [`create`]
//! - `diff`: pure comparison of two trees into an ordered change list
//! - `patch`: applies change lists to a host and runs lifecycle tasks
//! - `schedule`: batches update requests into at most one pass per tick
//!
//! # Example
//!
//! ```rust,ignore
//! use sprig_core::{attrs, create, ManualTicks, MemoryHost, Reconciler};
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_root("body");
//! let ticks = ManualTicks::new();
//! let reconciler = Reconciler::new(host, ticks.clone())?;
//!
//! let tree = reconciler.render(&create("p", attrs([("id", "greeting")]), ["hello"]), root);
//! ticks.run_pending()?;
//!
//! // Both requests are served by a single pass.
//! let tree = reconciler.migrate(&tree, &create("p", attrs([("id", "greeting")]), ["hi"]));
//! let tree = reconciler.migrate(&tree, &create("p", attrs([("id", "greeting")]), ["hey"]));
//! ticks.run_pending()?;
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod patch;
pub mod schedule;
pub mod vtree;

pub use config::ReconcilerConfig;
pub use diff::{diff, Change, ChangeKind};
pub use error::{ReconcileError, Result};
pub use patch::{Host, HostId, HostRef, LifecycleQueue, MemoryHost, PatchStats, Patcher, SortStrategy};
pub use schedule::{ManualTicks, Reconciler, TickQueue, TokioTicks};
pub use vtree::{attrs, create, leaf, AttrValue, Attrs, Callback, Child, NodeKind, VNode};
