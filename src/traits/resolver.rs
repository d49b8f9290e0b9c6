//! Resolver traits for service resolution.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::registration::AnyArc;

/// Object-safe resolution over type-erased instances.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider). Most callers
/// use the typed helpers of [`Resolver`] instead.
pub trait ResolverCore {
    /// Resolves one identifier to its cached (or freshly built) instance.
    fn resolve_any(&self, identifier: &Identifier) -> DiResult<AnyArc>;

    /// Resolves every variant registered for the identifier's family.
    fn resolve_all(&self, identifier: &Identifier) -> DiResult<BTreeMap<Arc<str>, AnyArc>>;
}

/// Typed resolution helpers built on [`ResolverCore`].
///
/// Concrete instances are stored as `Arc<T>`; trait objects are registered as
/// `Arc<dyn Trait>` values and come back through the `*_trait` methods.
///
/// # Examples
///
/// ```
/// use tiered_di::{Container, Identifier, Implementation, Resolver};
/// use std::sync::Arc;
///
/// trait Formatter: Send + Sync {
///     fn format(&self, text: &str) -> String;
/// }
///
/// struct Upper;
/// impl Formatter for Upper {
///     fn format(&self, text: &str) -> String { text.to_uppercase() }
/// }
///
/// let formatter = Identifier::new("Formatter");
/// let mut container = Container::new();
/// container.add_impl(
///     formatter.clone(),
///     Implementation::value(Arc::new(Upper) as Arc<dyn Formatter>),
///     &[],
/// )?;
/// container.add_impl(Identifier::new("tab-width"), Implementation::value(4usize), &[])?;
///
/// let provider = container.root_provider();
/// assert_eq!(provider.get_trait::<dyn Formatter>(&formatter)?.format("hi"), "HI");
/// assert_eq!(*provider.get::<usize>(&Identifier::new("tab-width"))?, 4);
/// # Ok::<(), tiered_di::DiError>(())
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves and downcasts to `T`.
    fn get<T: Any + Send + Sync>(&self, identifier: &Identifier) -> DiResult<Arc<T>> {
        downcast(identifier, self.resolve_any(identifier)?)
    }

    /// Resolves the service registered under `Identifier::of::<T>()`.
    fn get_of<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get(&Identifier::of::<T>())
    }

    /// Resolves a trait object registered as `Arc<T>`.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, identifier: &Identifier) -> DiResult<Arc<T>> {
        downcast_trait(identifier, self.resolve_any(identifier)?)
    }

    /// Like [`get`](Self::get), but an unreachable identifier yields `Ok(None)`.
    ///
    /// Only a miss on `identifier` itself maps to `None`. Inside a factory that
    /// miss is reported as `MissingDependency` naming `identifier`; a missing
    /// dependency further down names another identifier and is still an error.
    fn try_get<T: Any + Send + Sync>(&self, identifier: &Identifier) -> DiResult<Option<Arc<T>>> {
        match self.get(identifier) {
            Ok(instance) => Ok(Some(instance)),
            Err(DiError::ServiceNotFound { .. }) => Ok(None),
            Err(DiError::MissingDependency { identifier: missing, .. }) if missing == *identifier => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Resolves every variant of the family, downcast to `T`.
    fn get_all<T: Any + Send + Sync>(&self, identifier: &Identifier) -> DiResult<BTreeMap<Arc<str>, Arc<T>>> {
        self.resolve_all(identifier)?
            .into_iter()
            .map(|(variant, instance)| -> DiResult<(Arc<str>, Arc<T>)> {
                let instance = downcast(&identifier.variant(variant.clone()), instance)?;
                Ok((variant, instance))
            })
            .collect()
    }

    /// Resolves every variant of the family as trait objects.
    fn get_all_trait<T: ?Sized + Send + Sync + 'static>(
        &self,
        identifier: &Identifier,
    ) -> DiResult<BTreeMap<Arc<str>, Arc<T>>> {
        self.resolve_all(identifier)?
            .into_iter()
            .map(|(variant, instance)| -> DiResult<(Arc<str>, Arc<T>)> {
                let instance = downcast_trait(&identifier.variant(variant.clone()), instance)?;
                Ok((variant, instance))
            })
            .collect()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

pub(crate) fn downcast<T: Any + Send + Sync>(identifier: &Identifier, instance: AnyArc) -> DiResult<Arc<T>> {
    instance.downcast::<T>().map_err(|_| DiError::TypeMismatch {
        identifier: identifier.clone(),
        expected: std::any::type_name::<T>(),
    })
}

// Trait objects are stored as Arc<Arc<dyn Trait>> inside the erased value
pub(crate) fn downcast_trait<T: ?Sized + Send + Sync + 'static>(
    identifier: &Identifier,
    instance: AnyArc,
) -> DiResult<Arc<T>> {
    instance
        .downcast::<Arc<T>>()
        .map(|outer| Arc::clone(&*outer))
        .map_err(|_| DiError::TypeMismatch {
            identifier: identifier.clone(),
            expected: std::any::type_name::<Arc<T>>(),
        })
}
