//! Attribute values and callbacks.
//!
//! Attributes are kept in insertion order ([`IndexMap`]) so that diffs, and
//! therefore host mutations, come out in a deterministic order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Reserved attribute carrying a keylist item's identity. Never sent to the host.
pub const KEY: &str = "key";

/// Callback attribute run once after the owning node is built into the host.
pub const ON_MOUNT: &str = "onmount";

/// Callback attribute run once after the owning node leaves the host.
pub const ON_UNMOUNT: &str = "onunmount";

/// Ordered attribute mapping of an element.
pub type Attrs = IndexMap<String, AttrValue>;

/// A zero-argument callback stored in an attribute.
///
/// Two callbacks are equal only if they are the same allocation, which is
/// how the differ decides whether a handler attribute changed.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.0)();
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// The value of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Plain string attribute.
    Text(String),
    /// Boolean attribute: `true` writes it empty, `false` removes it.
    Bool(bool),
    /// Function-valued attribute, assigned to the host as a live property.
    Callback(Callback),
}

impl AttrValue {
    /// The string payload, if this is a text attribute.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The callback, if this is a function-valued attribute.
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            AttrValue::Callback(callback) => Some(callback),
            _ => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, AttrValue::Callback(_))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Callback> for AttrValue {
    fn from(value: Callback) -> Self {
        AttrValue::Callback(value)
    }
}

/// Build an [`Attrs`] map from name/value pairs.
///
/// ```rust,ignore
/// let attrs = attrs([("id", "foo"), ("class", "bar")]);
/// ```
pub fn attrs<I, K, V>(pairs: I) -> Attrs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}
