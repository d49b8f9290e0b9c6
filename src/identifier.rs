//! Service identifiers for the dependency injection container.

use std::fmt;
use std::sync::Arc;

/// Variant used when an identifier is created without one.
pub const DEFAULT_VARIANT: &str = "$default";

/// Name of the reserved identifier that always resolves to the provider itself.
pub const PROVIDER_NAME: &str = "$provider";

/// Key for service registration and lookup.
///
/// An identifier is a family name plus a variant key. Two identifiers denote
/// the same service iff both parts match; an identifier created without a
/// variant uses [`DEFAULT_VARIANT`]. Identifiers are plain values: cloning is
/// cheap and equal values may be created independently anywhere.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{Identifier, DEFAULT_VARIANT};
///
/// let port = Identifier::new("Port");
/// let left = port.variant("left");
///
/// assert_eq!(port.variant_key(), DEFAULT_VARIANT);
/// assert_eq!(left.name(), "Port");
/// assert_eq!(left.variant_key(), "left");
/// assert_eq!(left, Identifier::with_variant("Port", "left"));
/// assert_ne!(left, port);
/// assert_eq!(left.to_string(), "Port(left)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    name: Arc<str>,
    variant: Arc<str>,
}

impl Identifier {
    /// Creates an identifier with the default variant.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            variant: Arc::from(DEFAULT_VARIANT),
        }
    }

    /// Creates an identifier for a specific variant.
    pub fn with_variant(name: impl Into<Arc<str>>, variant: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            variant: variant.into(),
        }
    }

    /// Identifier named after a Rust type.
    ///
    /// ```rust
    /// use tiered_di::Identifier;
    ///
    /// struct Ruler;
    /// assert!(Identifier::of::<Ruler>().name().ends_with("Ruler"));
    /// assert_eq!(Identifier::of::<Ruler>(), Identifier::of::<Ruler>());
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// The reserved self-identifier; resolving it yields the provider.
    pub fn provider() -> Self {
        Self::new(PROVIDER_NAME)
    }

    /// Same family, different variant.
    pub fn variant(&self, variant: impl Into<Arc<str>>) -> Self {
        Self {
            name: self.name.clone(),
            variant: variant.into(),
        }
    }

    /// Family name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant key (the default variant when none was given).
    pub fn variant_key(&self) -> &str {
        &self.variant
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub(crate) fn variant_arc(&self) -> &Arc<str> {
        &self.variant
    }

    /// True when the identifier carries no explicit variant.
    pub fn is_default_variant(&self) -> bool {
        &*self.variant == DEFAULT_VARIANT
    }

    /// True for the reserved self-identifier.
    pub fn is_provider(&self) -> bool {
        &*self.name == PROVIDER_NAME && self.is_default_variant()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_variant() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.variant)
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::new(name)
    }
}
