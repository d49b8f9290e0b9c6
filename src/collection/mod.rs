//! Service container module for dependency injection.
//!
//! This module contains the Container type, the registry of service
//! definitions, and the fluent builders used to populate it. Nothing in here
//! ever creates an instance: factories only run inside a provider.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::internal::Lock;
use crate::observer::{DiObserver, Observers};
use crate::provider::ServiceProvider;
use crate::registration::{AnyArc, Factory, Registration, RegistrationKind, Registry};
use crate::scope::Scope;

pub mod implementation;
pub mod module_system;

pub use implementation::*;
pub use module_system::*;

/// Where and how a primitive registration is stored.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{RegistrationOptions, Scope};
///
/// let options = RegistrationOptions::in_scope(Scope::new("editor")).overriding();
/// assert_eq!(options.scope.name(), "editor");
/// assert!(options.override_existing);
///
/// let defaults = RegistrationOptions::default();
/// assert!(defaults.scope.is_root());
/// assert!(!defaults.override_existing);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistrationOptions {
    /// Scope the definition is pinned to (root by default)
    pub scope: Scope,
    /// Replace an existing definition instead of failing
    pub override_existing: bool,
}

impl RegistrationOptions {
    pub fn in_scope(scope: Scope) -> Self {
        Self {
            scope,
            override_existing: false,
        }
    }

    pub fn overriding(mut self) -> Self {
        self.override_existing = true;
        self
    }
}

/// Registry of service definitions, grouped by scope.
///
/// A definition is keyed by `(scope, identifier name, variant)`; registering
/// the same triple twice fails with
/// [`DuplicateServiceDefinition`](DiError::DuplicateServiceDefinition) unless
/// an override form is used. Providers built from a container share its
/// registry, so definitions added later are visible to lookups that are not
/// already cached.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{Arguments, Container, Dependency, DiResult, Injectable, Resolver};
/// use std::sync::Arc;
///
/// struct Greeting { value: String }
/// impl Injectable for Greeting {
///     fn inject(_: &Arguments) -> DiResult<Self> {
///         Ok(Greeting { value: "hello world".into() })
///     }
/// }
///
/// struct Banner { greeting: Arc<Greeting> }
/// impl Injectable for Banner {
///     fn inject(args: &Arguments) -> DiResult<Self> {
///         Ok(Banner { greeting: args.get(0)? })
///     }
/// }
///
/// let mut container = Container::new();
/// container
///     .add::<Greeting>(&[])?
///     .add::<Banner>(&[Dependency::of::<Greeting>()])?;
/// assert_eq!(container.size(), 2);
///
/// let banner = container.root_provider().get_of::<Banner>()?;
/// assert_eq!(banner.greeting.value, "hello world");
/// # Ok::<(), tiered_di::DiError>(())
/// ```
pub struct Container {
    registry: Arc<Lock<Registry>>,
    observers: Observers,
}

impl Container {
    /// Creates a new empty container.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Lock::new(Registry::new())),
            observers: Observers::new(),
        }
    }

    /// Pins the following registrations to `scope`.
    ///
    /// ```rust
    /// use tiered_di::{Container, Identifier, Implementation, Scope};
    ///
    /// let page = Scope::new("page");
    /// let mut container = Container::new();
    /// container
    ///     .scope(&page)
    ///     .add_impl(Identifier::new("Zoom"), Implementation::value(1.0f64), &[])?
    ///     .add_impl(Identifier::new("Ruler"), Implementation::value(true), &[])?;
    ///
    /// assert!(container.contains(&Identifier::new("Zoom"), &page));
    /// assert!(!container.contains(&Identifier::new("Zoom"), &Scope::root()));
    /// # Ok::<(), tiered_di::DiError>(())
    /// ```
    pub fn scope(&mut self, scope: &Scope) -> ScopeBuilder<'_> {
        ScopeBuilder {
            container: self,
            scope: scope.clone(),
        }
    }

    // ----- Root-scope registrations -----

    /// Registers `T` under `Identifier::of::<T>()` in the root scope.
    pub fn add<T: Injectable>(&mut self, deps: &[Dependency]) -> DiResult<&mut Self> {
        self.insert_impl(&Scope::root(), Identifier::of::<T>(), Implementation::constructor::<T>(), deps, false)?;
        Ok(self)
    }

    /// Registers an implementation under an explicit identifier in the root scope.
    pub fn add_impl(
        &mut self,
        identifier: Identifier,
        implementation: Implementation,
        deps: &[Dependency],
    ) -> DiResult<&mut Self> {
        self.insert_impl(&Scope::root(), identifier, implementation, deps, false)?;
        Ok(self)
    }

    /// Like [`add_impl`](Self::add_impl), replacing any existing definition.
    pub fn override_impl(
        &mut self,
        identifier: Identifier,
        implementation: Implementation,
        deps: &[Dependency],
    ) -> DiResult<&mut Self> {
        self.insert_impl(&Scope::root(), identifier, implementation, deps, true)?;
        Ok(self)
    }

    /// Like [`add`](Self::add), replacing any existing definition.
    pub fn override_with<T: Injectable>(&mut self, deps: &[Dependency]) -> DiResult<&mut Self> {
        self.insert_impl(&Scope::root(), Identifier::of::<T>(), Implementation::constructor::<T>(), deps, true)?;
        Ok(self)
    }

    // ----- Primitives -----

    /// Registers a factory receiving the resolving provider.
    ///
    /// The factory runs at most once per provider, on first resolution.
    ///
    /// ```rust
    /// use tiered_di::{Container, Identifier, RegistrationOptions, Resolver};
    ///
    /// let mut container = Container::new();
    /// container.add_value(Identifier::new("Width"), 640u32, RegistrationOptions::default())?;
    /// container.add_factory(
    ///     Identifier::new("Area"),
    ///     |provider| Ok(*provider.get::<u32>(&Identifier::new("Width"))? * 480),
    ///     RegistrationOptions::default(),
    /// )?;
    ///
    /// let provider = container.root_provider();
    /// assert_eq!(*provider.get::<u32>(&Identifier::new("Area"))?, 307_200);
    /// # Ok::<(), tiered_di::DiError>(())
    /// ```
    pub fn add_factory<T, F>(&mut self, identifier: Identifier, factory: F, options: RegistrationOptions) -> DiResult<&mut Self>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceProvider) -> DiResult<T> + Send + Sync + 'static,
    {
        let erased: Factory = Arc::new(move |provider: &ServiceProvider| -> DiResult<AnyArc> {
            Ok(Arc::new(factory(provider)?) as AnyArc)
        });
        let registration = Registration::new(erased, RegistrationKind::Factory, Some(std::any::type_name::<T>()));
        self.insert(&options.scope, &identifier, registration, options.override_existing)?;
        Ok(self)
    }

    /// Registers a prebuilt value shared by every resolution.
    pub fn add_value<T: Any + Send + Sync>(
        &mut self,
        identifier: Identifier,
        value: T,
        options: RegistrationOptions,
    ) -> DiResult<&mut Self> {
        self.insert_impl(&options.scope, identifier, Implementation::value(value), &[], options.override_existing)?;
        Ok(self)
    }

    // ----- Lookup -----

    /// Exact `(scope, identifier)` lookup. Scope parents are never consulted.
    pub fn get_factory(&self, identifier: &Identifier, scope: &Scope) -> Option<Factory> {
        self.registry
            .lock()
            .get(identifier, scope.key())
            .map(|registration| registration.factory.clone())
    }

    /// Every variant registered for the identifier's family in `scope`.
    pub fn get_factory_all(&self, identifier: &Identifier, scope: &Scope) -> BTreeMap<Arc<str>, Factory> {
        self.registry
            .lock()
            .variants(identifier.name(), scope.key())
            .map(|table| {
                table
                    .iter()
                    .map(|(variant, registration)| (variant.clone(), registration.factory.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, identifier: &Identifier, scope: &Scope) -> bool {
        self.registry.lock().contains(identifier, scope.key())
    }

    /// Total number of definitions across every scope.
    pub fn size(&self) -> usize {
        self.registry.lock().len()
    }

    /// Descriptors of every definition, ordered by scope then identifier.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut descriptors: Vec<ServiceDescriptor> = self
            .registry
            .lock()
            .iter()
            .map(|(scope, identifier, registration)| ServiceDescriptor {
                scope: scope.clone(),
                identifier,
                kind: registration.kind,
                impl_type_name: registration.type_name,
            })
            .collect();
        descriptors.sort_by(|a, b| a.scope.cmp(&b.scope).then_with(|| a.identifier.cmp(&b.identifier)));
        descriptors
    }

    // ----- Providers -----

    /// Builds a provider pinned to `scope` (root when `None`), delegating
    /// anything its scope lacks to `parent`.
    ///
    /// Each call returns a provider with a fresh, private cache.
    pub fn provider(&self, scope: Option<&Scope>, parent: Option<&ServiceProvider>) -> ServiceProvider {
        let scope = scope.cloned().unwrap_or_default();
        tracing::debug!(
            scope = %scope,
            parent_scope = parent.map(|p| p.scope().name()),
            registrations = self.size(),
            "building service provider"
        );
        ServiceProvider::new(self.registry.clone(), scope, parent.cloned(), self.observers.clone())
    }

    /// Shorthand for a parentless root-scope provider.
    pub fn root_provider(&self) -> ServiceProvider {
        self.provider(None, None)
    }

    // ----- Observability -----

    /// Adds an observer to every provider built from now on.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str(&format!("Registrations: {}\n", self.size()));
        s.push_str(&format!("Observers: {}\n", self.observers.len()));
        let mut current: Option<Arc<str>> = None;
        for descriptor in self.descriptors() {
            if current.as_deref() != Some(descriptor.scope()) {
                s.push_str(&format!("[{}]\n", descriptor.scope));
                current = Some(descriptor.scope.clone());
            }
            s.push_str(&format!(
                "  {} ({:?}: {})\n",
                descriptor.identifier,
                descriptor.kind,
                descriptor.impl_type_name.unwrap_or("?")
            ));
        }
        s
    }

    fn insert_impl(
        &mut self,
        scope: &Scope,
        identifier: Identifier,
        implementation: Implementation,
        deps: &[Dependency],
        override_existing: bool,
    ) -> DiResult<()> {
        let kind = implementation.kind();
        let type_name = implementation.type_name();
        let factory = implementation.into_factory(identifier.clone(), deps.to_vec());
        self.insert(scope, &identifier, Registration::new(factory, kind, Some(type_name)), override_existing)
    }

    fn insert(
        &mut self,
        scope: &Scope,
        identifier: &Identifier,
        registration: Registration,
        override_existing: bool,
    ) -> DiResult<()> {
        if identifier.is_provider() {
            return Err(DiError::DuplicateServiceDefinition {
                scope: scope.key_arc().clone(),
                identifier: identifier.clone(),
            });
        }
        let kind = registration.kind;
        self.registry
            .lock()
            .insert(scope, identifier, registration, override_existing)
            .inspect_err(|err| tracing::debug!(error = %err, "registration rejected"))?;
        tracing::trace!(identifier = %identifier, scope = %scope, ?kind, override_existing, "registered service");
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow copy: new registration maps sharing the same factories.
///
/// Providers built from the copy never see later changes to the original,
/// and vice versa.
impl Clone for Container {
    fn clone(&self) -> Self {
        let registry = self.registry.lock().clone();
        Self {
            registry: Arc::new(Lock::new(registry)),
            observers: self.observers.clone(),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("size", &self.size())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Fluent registration builder pinned to one scope.
///
/// Returned by [`Container::scope`]; every method registers into that scope.
pub struct ScopeBuilder<'c> {
    container: &'c mut Container,
    scope: Scope,
}

impl ScopeBuilder<'_> {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn add<T: Injectable>(&mut self, deps: &[Dependency]) -> DiResult<&mut Self> {
        self.container
            .insert_impl(&self.scope, Identifier::of::<T>(), Implementation::constructor::<T>(), deps, false)?;
        Ok(self)
    }

    pub fn add_impl(
        &mut self,
        identifier: Identifier,
        implementation: Implementation,
        deps: &[Dependency],
    ) -> DiResult<&mut Self> {
        self.container.insert_impl(&self.scope, identifier, implementation, deps, false)?;
        Ok(self)
    }

    pub fn override_impl(
        &mut self,
        identifier: Identifier,
        implementation: Implementation,
        deps: &[Dependency],
    ) -> DiResult<&mut Self> {
        self.container.insert_impl(&self.scope, identifier, implementation, deps, true)?;
        Ok(self)
    }

    pub fn override_with<T: Injectable>(&mut self, deps: &[Dependency]) -> DiResult<&mut Self> {
        self.container
            .insert_impl(&self.scope, Identifier::of::<T>(), Implementation::constructor::<T>(), deps, true)?;
        Ok(self)
    }

    /// Registers a raw factory in this scope.
    pub fn add_factory<T, F>(&mut self, identifier: Identifier, factory: F) -> DiResult<&mut Self>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceProvider) -> DiResult<T> + Send + Sync + 'static,
    {
        let options = RegistrationOptions::in_scope(self.scope.clone());
        self.container.add_factory(identifier, factory, options)?;
        Ok(self)
    }

    /// Registers a prebuilt value in this scope.
    pub fn add_value<T: Any + Send + Sync>(&mut self, identifier: Identifier, value: T) -> DiResult<&mut Self> {
        let options = RegistrationOptions::in_scope(self.scope.clone());
        self.container.add_value(identifier, value, options)?;
        Ok(self)
    }
}
