//! Error Types
//!
//! Every failure the engine can report is a caller contract violation: a
//! malformed tree, a missing host, or a `prev` tree that was never built.
//! None of them is retried or papered over with a default. They surface to
//! whoever drives the pass (the caller of `run_pending`, or the log when the
//! tokio tick driver runs the pass).

use thiserror::Error;

/// Errors raised while building, diffing or patching a tree.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A keylist child has no non-empty string `key`.
    ///
    /// Raised before any change of the pass is applied, so the host is left
    /// exactly as it was.
    #[error("all nodes in an iteration must have a unique `key` attribute (item {index} has none)")]
    MissingKey {
        /// Position of the offending child within its keylist.
        index: usize,
    },

    /// The host cannot create or mutate native nodes.
    #[error("no host environment is available to render into")]
    NoHostEnvironment,

    /// An update reached the host before `render` supplied a target.
    #[error("no render target: `render` must be called before the first pass runs")]
    NoRenderTarget,

    /// A change refers to a node that holds no host reference.
    #[error("{what} has no host node; was the previous tree ever built?")]
    Detached {
        /// What the patcher was looking for.
        what: &'static str,
    },

    /// A configuration document could not be parsed.
    #[error("invalid reconciler configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReconcileError>;
