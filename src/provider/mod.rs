//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type, the runtime resolver that
//! turns registered definitions into cached instances for one scope.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::internal::{Lock, ResolutionStacks, StackGuard};
use crate::observer::Observers;
use crate::registration::{AnyArc, Map, Registration, Registry};
use crate::scope::Scope;
use crate::traits::ResolverCore;

/// Runtime resolver bound to one scope and an optional parent provider.
///
/// A provider resolves definitions registered for its own scope, caches every
/// instance it builds for its whole lifetime, and hands anything its scope does
/// not define to its parent. Factories receive the provider that is resolving
/// them, so nested lookups share one cache and one resolution stack: a diamond
/// dependency is built once.
///
/// Resolution stacks are kept per thread, so threads resolving through one
/// provider never see each other's in-flight identifiers. Two threads that
/// miss the cache for the same identifier at once may both run its factory;
/// the first instance cached is kept and returned to both.
///
/// Handles are cheap to clone; clones share the same cache. Two providers
/// built separately from the same container and scope never share a cache.
///
/// # Examples
///
/// ```
/// use tiered_di::{Container, Identifier, Implementation, Resolver, Scope};
/// use std::sync::Arc;
///
/// let workspace = Scope::new("workspace");
/// let document = Scope::child_of("document", &workspace);
///
/// let mut container = Container::new();
/// container
///     .scope(&workspace)
///     .add_impl(Identifier::new("Settings"), Implementation::value("dark"), &[])?;
/// container.scope(&document).add_impl(
///     Identifier::new("Title"),
///     Implementation::function(|_| Ok(String::from("untitled"))),
///     &[],
/// )?;
///
/// let workspace_provider = container.provider(Some(&workspace), None);
/// let document_provider = container.provider(Some(&document), Some(&workspace_provider));
///
/// // Found in the document scope itself
/// assert_eq!(*document_provider.get::<String>(&Identifier::new("Title"))?, "untitled");
/// // Delegated to the parent provider
/// assert_eq!(*document_provider.get::<&str>(&Identifier::new("Settings"))?, "dark");
/// # Ok::<(), tiered_di::DiError>(())
/// ```
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    registry: Arc<Lock<Registry>>,
    scope: Scope,
    parent: Option<ServiceProvider>,
    cache: Lock<Map<Identifier, AnyArc>>,
    stacks: Lock<ResolutionStacks>,
    observers: Observers,
}

impl ServiceProvider {
    pub(crate) fn new(
        registry: Arc<Lock<Registry>>,
        scope: Scope,
        parent: Option<ServiceProvider>,
        observers: Observers,
    ) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                scope,
                parent,
                cache: Lock::new(Map::default()),
                stacks: Lock::new(ResolutionStacks::default()),
                observers,
            }),
        }
    }

    /// The scope this provider resolves definitions from.
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    /// The runtime parent, if one was wired in.
    pub fn parent(&self) -> Option<&ServiceProvider> {
        self.inner.parent.as_ref()
    }

    /// True when both handles refer to the same provider (and cache).
    pub fn ptr_eq(a: &ServiceProvider, b: &ServiceProvider) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Number of instances this provider has cached.
    pub fn cached_len(&self) -> usize {
        self.inner.cache.lock().len()
    }

    /// True when the identifier is cached here or reachable through this
    /// provider's scope or any parent provider. Never runs a factory.
    pub fn has(&self, identifier: &Identifier) -> bool {
        if identifier.is_provider() || self.inner.cache.lock().contains_key(identifier) {
            return true;
        }
        if self.inner.registry.lock().contains(identifier, self.inner.scope.key()) {
            return true;
        }
        self.parent().is_some_and(|parent| parent.has(identifier))
    }

    /// Resolves one identifier.
    ///
    /// Order of checks: the self-identifier, this provider's cache, the cycle
    /// and depth guards, this scope's definition, then the parent provider.
    /// On success the instance is cached here; on failure nothing is cached.
    pub fn get_any(&self, identifier: &Identifier) -> DiResult<AnyArc> {
        self.resolve(identifier, None, 0)
    }

    /// Resolves every variant registered for the identifier's family in this
    /// provider's scope.
    ///
    /// Each variant goes through [`get_any`](Self::get_any) and so shares the
    /// cache and guards. When this scope registers no variant at all, the call
    /// is delegated to the parent; without a parent the map is empty.
    pub fn get_all_any(&self, identifier: &Identifier) -> DiResult<BTreeMap<Arc<str>, AnyArc>> {
        let variants: Vec<Identifier> = {
            let registry = self.inner.registry.lock();
            registry
                .variants(identifier.name(), self.inner.scope.key())
                .map(|table| {
                    table
                        .iter()
                        .map(|(variant, _)| identifier.variant(variant.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        if variants.is_empty() {
            return match self.parent() {
                Some(parent) => {
                    tracing::trace!(identifier = %identifier, scope = %self.inner.scope, "delegating get_all to parent provider");
                    parent.get_all_any(identifier)
                }
                None => Ok(BTreeMap::new()),
            };
        }

        let mut instances = BTreeMap::new();
        for variant in variants {
            let instance = self.get_any(&variant)?;
            instances.insert(variant.variant_arc().clone(), instance);
        }
        Ok(instances)
    }

    /// `requested_by` and `outer_depth` carry the dependent and the chain depth
    /// across a delegation from a child provider.
    fn resolve(
        &self,
        identifier: &Identifier,
        requested_by: Option<&Identifier>,
        outer_depth: usize,
    ) -> DiResult<AnyArc> {
        if identifier.is_provider() {
            return Ok(Arc::new(self.clone()) as AnyArc);
        }

        let cached = self.inner.cache.lock().get(identifier).cloned();
        if let Some(cached) = cached {
            tracing::trace!(identifier = %identifier, scope = %self.inner.scope, "cache hit");
            return Ok(cached);
        }

        let guard = StackGuard::enter(&self.inner.stacks, identifier, outer_depth)?;
        let dependent = guard.dependent().or(requested_by).cloned();

        let Some(registration) = self.lookup(identifier) else {
            let depth = guard.depth() - 1;
            drop(guard);
            return self.delegate(identifier, dependent, depth);
        };

        self.construct(identifier, &registration)
    }

    fn lookup(&self, identifier: &Identifier) -> Option<Registration> {
        self.inner
            .registry
            .lock()
            .get(identifier, self.inner.scope.key())
            .cloned()
    }

    fn delegate(
        &self,
        identifier: &Identifier,
        dependent: Option<Identifier>,
        depth: usize,
    ) -> DiResult<AnyArc> {
        if let Some(parent) = self.parent() {
            tracing::trace!(
                identifier = %identifier,
                scope = %self.inner.scope,
                parent_scope = %parent.scope(),
                "delegating to parent provider"
            );
            return parent.resolve(identifier, dependent.as_ref(), depth);
        }

        let err = match dependent {
            Some(dependent) => DiError::MissingDependency {
                identifier: identifier.clone(),
                dependent,
            },
            None => DiError::ServiceNotFound {
                identifier: identifier.clone(),
            },
        };
        tracing::debug!(scope = %self.inner.scope, error = %err, "resolution failed");
        Err(err)
    }

    fn construct(&self, identifier: &Identifier, registration: &Registration) -> DiResult<AnyArc> {
        let observers = &self.inner.observers;
        let scope = &self.inner.scope;

        if observers.has_observers() {
            observers.resolving(identifier, scope);
        }
        let start = Instant::now();

        match (registration.factory)(self) {
            Ok(built) => {
                // First instance cached wins a race between threads
                let instance = self
                    .inner
                    .cache
                    .lock()
                    .entry(identifier.clone())
                    .or_insert(built)
                    .clone();
                let duration = start.elapsed();
                let depth = self.inner.stacks.lock().depth();
                tracing::debug!(identifier = %identifier, scope = %scope, depth, ?duration, "constructed service");
                if observers.has_observers() {
                    observers.resolved(identifier, scope, duration);
                }
                Ok(instance)
            }
            Err(err) => {
                if observers.has_observers() {
                    observers.failed(identifier, scope, &err);
                }
                Err(err)
            }
        }
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Provider Debug ===\n");
        s.push_str(&format!("Scope: {}\n", self.inner.scope));
        let mut chain = Vec::new();
        let mut parent = self.parent();
        while let Some(p) = parent {
            chain.push(p.scope().name().to_string());
            parent = p.parent();
        }
        s.push_str(&format!("Parents: [{}]\n", chain.join(", ")));
        s.push_str("Cached:\n");
        let mut cached: Vec<String> = self.inner.cache.lock().keys().map(ToString::to_string).collect();
        cached.sort();
        for identifier in cached {
            s.push_str(&format!("  {}\n", identifier));
        }
        s
    }
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("scope", &self.inner.scope.name())
            .field("parent", &self.parent().map(|p| p.scope().name().to_string()))
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, identifier: &Identifier) -> DiResult<AnyArc> {
        self.get_any(identifier)
    }

    fn resolve_all(&self, identifier: &Identifier) -> DiResult<BTreeMap<Arc<str>, AnyArc>> {
        self.get_all_any(identifier)
    }
}
