//! Reconciler Configuration
//!
//! Knobs that change how a pass touches the host without changing what the
//! host ends up looking like. Every field has a default, so an empty JSON
//! object is a valid configuration.
//!
//! ```rust,ignore
//! let config = ReconcilerConfig::from_json(r#"{ "sort_strategy": "move_all" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::patch::SortStrategy;

/// Attribute names mirrored as live host properties by default.
pub const DEFAULT_LIVE_PROPERTIES: [&str; 3] = ["value", "checked", "selected"];

/// Per-reconciler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// How keyed lists are repositioned during a `Sort`.
    pub sort_strategy: SortStrategy,

    /// Attributes whose values are also written as live properties.
    ///
    /// Form controls keep their live state in properties, not attributes:
    /// removing the `value` attribute alone would leave the typed text in
    /// place. Names listed here are assigned (and cleared) as properties in
    /// addition to the attribute write.
    pub live_properties: Vec<String>,

    /// Validate every keylist of a tree before it touches the host.
    ///
    /// The differ only checks keylists it compares. With this enabled a
    /// freshly built subtree (first mount, added or replaced nodes) fails
    /// with `MissingKey` up front instead of being built silently.
    pub validate_keys: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            sort_strategy: SortStrategy::default(),
            live_properties: DEFAULT_LIVE_PROPERTIES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            validate_keys: true,
        }
    }
}

impl ReconcilerConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `name` is mirrored as a live property.
    pub fn is_live_property(&self, name: &str) -> bool {
        self.live_properties.iter().any(|live| live == name)
    }
}
