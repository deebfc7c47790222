//! Scheduler
//!
//! Batches update requests so that the host is patched at most once per
//! tick, always against the newest requested tree.
//!
//! # Overview
//!
//! - [`Reconciler`] is the per-instance context: it owns the host, the
//!   [`RenderBuffer`] and the configuration. There is no global state; two
//!   reconcilers never share anything.
//! - A [`TickQueue`] decides when deferred passes run. [`ManualTicks`] runs
//!   them when told to (tests, embedders with their own frame loop) and
//!   [`TokioTicks`] spawns them on a tokio runtime.
//!
//! ```rust,ignore
//! let ticks = ManualTicks::new();
//! let reconciler = Reconciler::new(host, ticks.clone())?;
//! let tree = reconciler.render(&tree, root);
//! let tree = reconciler.migrate(&tree, &next_tree);
//! ticks.run_pending()?;
//! ```

mod buffer;
mod reconciler;
mod tick;

pub use buffer::RenderBuffer;
pub use reconciler::Reconciler;
pub use tick::{ManualTicks, Tick, TickQueue, TokioTicks};
