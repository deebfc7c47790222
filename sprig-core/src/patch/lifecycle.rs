//! Lifecycle Tasks
//!
//! `onmount` and `onunmount` callbacks are collected while a pass mutates
//! the host and run only once the pass is complete.
//!
//! # Guarantees
//!
//! - Every unmount task of a pass runs before any mount task of that pass.
//! - Within each group, tasks run in collection order.
//! - A task runs at most once: [`LifecycleQueue::flush`] consumes the queue.

use std::fmt;

use tracing::trace;

use crate::vtree::Callback;

/// Tasks collected during one pass.
#[derive(Default)]
pub struct LifecycleQueue {
    unmount: Vec<Callback>,
    mount: Vec<Callback>,
}

impl LifecycleQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an `onmount` task of a freshly built node.
    pub fn push_mount(&mut self, task: Callback) {
        self.mount.push(task);
    }

    /// Queue an `onunmount` task of a discarded node.
    pub fn push_unmount(&mut self, task: Callback) {
        self.unmount.push(task);
    }

    /// Number of queued mount tasks.
    pub fn mount_count(&self) -> usize {
        self.mount.len()
    }

    /// Number of queued unmount tasks.
    pub fn unmount_count(&self) -> usize {
        self.unmount.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mount.is_empty() && self.unmount.is_empty()
    }

    /// Run every unmount task, then every mount task.
    pub fn flush(self) {
        trace!(
            unmount = self.unmount.len(),
            mount = self.mount.len(),
            "flushing lifecycle tasks"
        );
        for task in self.unmount {
            task.call();
        }
        for task in self.mount {
            task.call();
        }
    }
}

impl fmt::Debug for LifecycleQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleQueue")
            .field("unmount", &self.unmount.len())
            .field("mount", &self.mount.len())
            .finish()
    }
}
