//! Service descriptors for introspection and diagnostics.

use std::sync::Arc;

use crate::identifier::Identifier;
use crate::registration::RegistrationKind;

/// Service descriptor for introspection and diagnostics
///
/// Contains metadata about one registered definition: the scope it lives in,
/// the identifier it answers to and how it was registered. Reading
/// descriptors never runs a factory.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{Container, Identifier, Implementation, RegistrationKind, Scope};
///
/// let page = Scope::new("page");
/// let mut container = Container::new();
/// container.add_impl(Identifier::new("Clock"), Implementation::value(0u64), &[])?;
/// container
///     .scope(&page)
///     .add_impl(Identifier::new("Grid"), Implementation::function(|_| Ok(8u32)), &[])?;
///
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let grid = descriptors.iter().find(|d| d.identifier.name() == "Grid").unwrap();
/// assert_eq!(grid.scope(), "page");
/// assert_eq!(grid.kind, RegistrationKind::Function);
/// assert_eq!(grid.type_name(), Some("u32"));
/// # Ok::<(), tiered_di::DiError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Registration scope key
    pub scope: Arc<str>,
    /// Identifier the definition answers to
    pub identifier: Identifier,
    /// How the definition was registered
    pub kind: RegistrationKind,
    /// Implementation type name (if available)
    pub impl_type_name: Option<&'static str>,
}

impl ServiceDescriptor {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.impl_type_name
    }

    /// True when the definition is a non-default variant of its family.
    pub fn is_variant(&self) -> bool {
        !self.identifier.is_default_variant()
    }

    /// Variant key, or `None` for the default variant.
    pub fn variant(&self) -> Option<&str> {
        if self.is_variant() {
            Some(self.identifier.variant_key())
        } else {
            None
        }
    }
}
