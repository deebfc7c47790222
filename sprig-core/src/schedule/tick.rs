//! Tick drivers.
//!
//! A tick is deferred work: the reconciler never runs a pass inline, it
//! hands a [`Tick`] to a [`TickQueue`] and returns. Which "later" that is
//! depends on the driver.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::error;

use crate::error::Result;

/// One unit of deferred work.
pub type Tick = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Somewhere to run ticks after the current call returns.
pub trait TickQueue: Send + Sync {
    fn schedule(&self, tick: Tick);
}

/// A queue that runs ticks only when asked to.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct ManualTicks {
    queue: Arc<Mutex<VecDeque<Tick>>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run every tick queued so far, in order.
    ///
    /// Ticks scheduled while the batch runs wait for the next call. Every
    /// tick of the batch runs even if an earlier one fails; the first error
    /// is returned.
    pub fn run_pending(&self) -> Result<usize> {
        let batch = std::mem::take(&mut *self.queue.lock());
        let ran = batch.len();
        let mut first_error = None;

        for tick in batch {
            if let Err(err) = tick() {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(ran),
        }
    }

    /// Run batches until nothing is left, including ticks scheduled by the
    /// ticks themselves. Stops at the first failing batch.
    pub fn run_until_idle(&self) -> Result<usize> {
        let mut ran = 0;
        while self.pending() > 0 {
            ran += self.run_pending()?;
        }
        Ok(ran)
    }
}

impl TickQueue for ManualTicks {
    fn schedule(&self, tick: Tick) {
        self.queue.lock().push_back(tick);
    }
}

impl fmt::Debug for ManualTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTicks")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Runs each tick as a task on a tokio runtime.
///
/// The task yields once before running, so a burst of updates issued from
/// the same task all land before the pass. Errors have nobody to return to
/// and are logged.
#[derive(Debug, Clone)]
pub struct TokioTicks {
    handle: Handle,
}

impl TokioTicks {
    /// Use the runtime the caller is running on, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl TickQueue for TokioTicks {
    fn schedule(&self, tick: Tick) {
        self.handle.spawn(async move {
            tokio::task::yield_now().await;
            if let Err(err) = tick() {
                error!(%err, "scheduled reconciliation failed");
            }
        });
    }
}
