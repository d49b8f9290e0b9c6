//! Service registration types.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::provider::ServiceProvider;
use crate::scope::Scope;

// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased factory: builds one instance from the resolving provider.
pub type Factory = Arc<dyn Fn(&ServiceProvider) -> DiResult<AnyArc> + Send + Sync>;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

/// How a definition was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// A type implementing [`Injectable`](crate::Injectable).
    Constructor,
    /// A closure over positional arguments.
    Function,
    /// A prebuilt shared value.
    Value,
    /// A raw factory receiving the provider.
    Factory,
}

/// One service definition: the factory plus diagnostics metadata.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) factory: Factory,
    pub(crate) kind: RegistrationKind,
    /// Implementation type name, when known
    pub(crate) type_name: Option<&'static str>,
}

impl Registration {
    pub(crate) fn new(factory: Factory, kind: RegistrationKind, type_name: Option<&'static str>) -> Self {
        Self {
            factory,
            kind,
            type_name,
        }
    }
}

/// Variants of one identifier family, in registration order.
pub(crate) type VariantTable = Vec<(Arc<str>, Registration)>;

/// Registration map: scope key -> identifier name -> variant -> definition.
///
/// Nothing in here ever runs a factory.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    scopes: Map<Arc<str>, Map<Arc<str>, VariantTable>>,
    len: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition; an occupied triple is replaced only with `override_existing`.
    pub(crate) fn insert(
        &mut self,
        scope: &Scope,
        identifier: &Identifier,
        registration: Registration,
        override_existing: bool,
    ) -> DiResult<()> {
        let table = self
            .scopes
            .entry(scope.key_arc().clone())
            .or_default()
            .entry(identifier.name_arc().clone())
            .or_default();

        match table
            .iter_mut()
            .find(|(variant, _)| **variant == *identifier.variant_key())
        {
            Some(slot) if override_existing => {
                slot.1 = registration;
                Ok(())
            }
            Some(_) => Err(DiError::DuplicateServiceDefinition {
                scope: scope.key_arc().clone(),
                identifier: identifier.clone(),
            }),
            None => {
                table.push((identifier.variant_arc().clone(), registration));
                self.len += 1;
                Ok(())
            }
        }
    }

    /// Exact-triple lookup; no scope chain is consulted.
    pub(crate) fn get(&self, identifier: &Identifier, scope: &str) -> Option<&Registration> {
        self.variants(identifier.name(), scope)?
            .iter()
            .find(|(variant, _)| **variant == *identifier.variant_key())
            .map(|(_, registration)| registration)
    }

    /// Every variant registered for a family in one scope.
    pub(crate) fn variants(&self, name: &str, scope: &str) -> Option<&VariantTable> {
        self.scopes.get(scope)?.get(name)
    }

    pub(crate) fn contains(&self, identifier: &Identifier, scope: &str) -> bool {
        self.get(identifier, scope).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Iterator over `(scope, identifier, registration)`.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Arc<str>, Identifier, &Registration)> {
        self.scopes.iter().flat_map(|(scope, names)| {
            names.iter().flat_map(move |(name, table)| {
                table.iter().map(move |(variant, registration)| {
                    (
                        scope,
                        Identifier::with_variant(name.clone(), variant.clone()),
                        registration,
                    )
                })
            })
        })
    }
}
