//! The per-instance reconciler.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info_span, warn};

use super::buffer::RenderBuffer;
use super::tick::TickQueue;
use crate::config::ReconcilerConfig;
use crate::diff::diff;
use crate::error::{ReconcileError, Result};
use crate::patch::{Host, HostId, LifecycleQueue, PatchStats, Patcher};
use crate::vtree::VNode;

struct State<H> {
    host: H,
    config: ReconcilerConfig,
    buffer: RenderBuffer,
    target: Option<HostId>,
    mounted: bool,
    tick_pending: bool,
    /// Generation of the first mount still waiting for its tick.
    pending_mount: Option<u64>,
    render_generation: u64,
    stats: PatchStats,
    passes: u64,
}

impl<H: Host> State<H> {
    /// Bring the host from the base tree to `desired`.
    fn pass(&mut self, desired: &VNode) -> Result<LifecycleQueue> {
        if self.config.validate_keys {
            desired.validate_keys()?;
        }

        let (queue, stats) = if self.mounted {
            let base = self.buffer.base().ok_or(ReconcileError::Detached {
                what: "render baseline",
            })?;
            let changes = diff(base, desired)?;
            debug!(
                changes = changes.len(),
                structural = changes.iter().filter(|change| change.kind().is_structural()).count(),
                attrs = changes.iter().filter(|change| change.kind().is_attr()).count(),
                "patching"
            );

            let mut patcher = Patcher::new(&mut self.host, &self.config);
            if let Some(target) = self.target {
                patcher = patcher.with_root(target);
            }
            patcher.apply(&changes)?;
            patcher.finish()
        } else {
            if let Some(generation) = self.pending_mount.take() {
                debug!(generation, "update supersedes pending first mount");
            }
            let target = self.target.ok_or(ReconcileError::NoRenderTarget)?;

            let mut patcher = Patcher::new(&mut self.host, &self.config);
            patcher.mount(desired, target);
            patcher.finish()
        };

        self.stats.merge(&stats);
        self.passes += 1;
        self.mounted = true;
        Ok(queue)
    }
}

/// Owns a host and keeps it in sync with the newest requested tree.
///
/// # Scheduling
///
/// Nothing touches the host synchronously. Calls only record what was asked
/// for and schedule a tick on the [`TickQueue`]:
///
/// 1. [`render`](Self::render) records a tree and a target, and schedules
///    the first mount.
/// 2. [`migrate`](Self::migrate) overwrites the desired tree and schedules a
///    single pass, unless one is already pending.
/// 3. A pass diffs the base tree against the desired one and patches the
///    host. If nothing was mounted yet, the pending first mount is dropped
///    and the desired tree is mounted instead.
/// 4. Once the host is patched, the desired tree becomes the new base and
///    the collected lifecycle tasks run, outside the reconciler's lock.
///
/// Any number of updates between two ticks cost one pass, and intermediate
/// trees are never diffed or built.
///
/// A failed pass leaves the host and the base tree alone and drops the
/// desired tree. The error goes to whoever runs the tick.
pub struct Reconciler<H> {
    inner: Arc<Mutex<State<H>>>,
    ticks: Arc<dyn TickQueue>,
}

impl<H> Clone for Reconciler<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            ticks: self.ticks.clone(),
        }
    }
}

impl<H: Host + Send + 'static> Reconciler<H> {
    /// Create a reconciler with the default configuration.
    pub fn new(host: H, ticks: impl TickQueue + 'static) -> Result<Self> {
        Self::with_config(host, ticks, ReconcilerConfig::default())
    }

    /// Create a reconciler.
    ///
    /// Fails with [`ReconcileError::NoHostEnvironment`] if the host cannot
    /// create nodes.
    pub fn with_config(
        host: H,
        ticks: impl TickQueue + 'static,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        if !host.environment_ready() {
            return Err(ReconcileError::NoHostEnvironment);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(State {
                host,
                config,
                buffer: RenderBuffer::new(),
                target: None,
                mounted: false,
                tick_pending: false,
                pending_mount: None,
                render_generation: 0,
                stats: PatchStats::default(),
                passes: 0,
            })),
            ticks: Arc::new(ticks),
        })
    }

    /// Schedule the first mount of `tree` into `target`.
    ///
    /// The mount is skipped if an update arrives before its tick. The target
    /// is not cleared; the tree is appended to whatever it already holds.
    pub fn render(&self, tree: &VNode, target: HostId) -> VNode {
        let generation = {
            let mut state = self.inner.lock();
            state.render_generation += 1;
            state.target = Some(target);
            state.mounted = false;
            state.buffer.reset(tree.clone());
            state.pending_mount = Some(state.render_generation);
            state.render_generation
        };

        let inner = self.inner.clone();
        self.ticks
            .schedule(Box::new(move || run_mount(&inner, generation)));
        tree.clone()
    }

    /// Request that the host move from `prev` to `next`.
    ///
    /// `prev` only matters for the first update: after that the reconciler
    /// diffs from the last tree it applied. Returns `next`.
    pub fn migrate(&self, prev: &VNode, next: &VNode) -> VNode {
        let schedule = {
            let mut state = self.inner.lock();
            state.buffer.seed(prev);
            state.buffer.request(next.clone());
            !std::mem::replace(&mut state.tick_pending, true)
        };

        if schedule {
            let inner = self.inner.clone();
            self.ticks.schedule(Box::new(move || run_pass(&inner)));
        }
        next.clone()
    }

    /// Alias of [`migrate`](Self::migrate).
    pub fn update(&self, prev: &VNode, next: &VNode) -> VNode {
        self.migrate(prev, next)
    }

    /// Whether a tree has been mounted into the target.
    pub fn is_mounted(&self) -> bool {
        self.inner.lock().mounted
    }

    /// Whether a pass is scheduled and has not run yet.
    pub fn tick_pending(&self) -> bool {
        self.inner.lock().tick_pending
    }

    /// The tree the host currently reflects (or will, once mounted).
    pub fn baseline(&self) -> Option<VNode> {
        self.inner.lock().buffer.base().cloned()
    }

    /// Cumulative counters over every pass.
    pub fn stats(&self) -> PatchStats {
        self.inner.lock().stats.clone()
    }

    /// Number of passes that reached the host.
    pub fn passes(&self) -> u64 {
        self.inner.lock().passes
    }

    pub fn config(&self) -> ReconcilerConfig {
        self.inner.lock().config.clone()
    }

    /// Inspect the host.
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.inner.lock().host)
    }
}

impl<H> fmt::Debug for Reconciler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Reconciler")
            .field("mounted", &state.mounted)
            .field("tick_pending", &state.tick_pending)
            .field("buffered", &state.buffer.len())
            .field("passes", &state.passes)
            .finish()
    }
}

fn run_mount<H: Host>(inner: &Mutex<State<H>>, generation: u64) -> Result<()> {
    let queue = {
        let mut state = inner.lock();
        if state.pending_mount != Some(generation) || state.buffer.len() >= 2 {
            debug!(generation, "first mount skipped");
            return Ok(());
        }
        state.pending_mount = None;

        let Some(tree) = state.buffer.base().cloned() else {
            return Ok(());
        };
        let span = info_span!("reconcile", pass = state.passes + 1, mount = true);
        let _entered = span.enter();

        state.pass(&tree).inspect_err(|err| {
            warn!(%err, "first mount failed");
        })?
    };

    flush_lifecycle(queue);
    Ok(())
}

fn run_pass<H: Host>(inner: &Mutex<State<H>>) -> Result<()> {
    let queue = {
        let mut state = inner.lock();
        state.tick_pending = false;

        let Some(desired) = state.buffer.desired().cloned() else {
            return Ok(());
        };
        let span = info_span!("reconcile", pass = state.passes + 1);
        let _entered = span.enter();

        match state.pass(&desired) {
            Ok(queue) => {
                state.buffer.collapse();
                queue
            }
            Err(err) => {
                warn!(%err, "pass failed, dropping requested tree");
                state.buffer.discard();
                return Err(err);
            }
        }
    };

    // Tasks may call back into the reconciler.
    flush_lifecycle(queue);
    Ok(())
}

fn flush_lifecycle(queue: LifecycleQueue) {
    if !queue.is_empty() {
        debug!(
            unmount = queue.unmount_count(),
            mount = queue.mount_count(),
            "running lifecycle tasks"
        );
    }
    queue.flush();
}
