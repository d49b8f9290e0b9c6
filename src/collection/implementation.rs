//! Explicit registration kinds and positional dependency arguments.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::identifier::Identifier;
use crate::provider::ServiceProvider;
use crate::registration::{AnyArc, Factory, RegistrationKind};
use crate::traits::resolver::{downcast, downcast_trait};

/// A type that builds itself from its positional dependencies.
///
/// Registering `T` with [`Container::add`](crate::Container::add) makes
/// `Identifier::of::<T>()` the service's identifier.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{Arguments, Container, Dependency, DiResult, Injectable, Resolver};
/// use std::sync::Arc;
///
/// struct Theme { accent: &'static str }
/// impl Injectable for Theme {
///     fn inject(_: &Arguments) -> DiResult<Self> {
///         Ok(Theme { accent: "teal" })
///     }
/// }
///
/// struct Toolbar { theme: Arc<Theme> }
/// impl Injectable for Toolbar {
///     fn inject(args: &Arguments) -> DiResult<Self> {
///         Ok(Toolbar { theme: args.get(0)? })
///     }
/// }
///
/// let mut container = Container::new();
/// container
///     .add::<Theme>(&[])?
///     .add::<Toolbar>(&[Dependency::of::<Theme>()])?;
///
/// let toolbar = container.root_provider().get_of::<Toolbar>()?;
/// assert_eq!(toolbar.theme.accent, "teal");
/// # Ok::<(), tiered_di::DiError>(())
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    fn inject(args: &Arguments) -> DiResult<Self>;
}

/// Builds an erased instance from resolved arguments.
pub type Constructor = Arc<dyn Fn(&Arguments) -> DiResult<AnyArc> + Send + Sync>;

/// What a registration produces, tagged explicitly.
#[derive(Clone)]
pub enum Implementation {
    /// An [`Injectable`] type.
    Constructor {
        type_name: &'static str,
        construct: Constructor,
    },
    /// A plain function of the positional arguments.
    Function {
        type_name: &'static str,
        call: Constructor,
    },
    /// A prebuilt instance shared by every resolution.
    Value {
        type_name: &'static str,
        value: AnyArc,
    },
}

impl Implementation {
    pub fn constructor<T: Injectable>() -> Self {
        Implementation::Constructor {
            type_name: std::any::type_name::<T>(),
            construct: Arc::new(|args: &Arguments| -> DiResult<AnyArc> { Ok(Arc::new(T::inject(args)?) as AnyArc) }),
        }
    }

    /// Wraps a closure. Return `Arc<dyn Trait>` to bind a trait object.
    pub fn function<T, F>(call: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        Implementation::Function {
            type_name: std::any::type_name::<T>(),
            call: Arc::new(move |args: &Arguments| -> DiResult<AnyArc> { Ok(Arc::new(call(args)?) as AnyArc) }),
        }
    }

    /// Binds a prebuilt value. Pass `Arc<dyn Trait>` to bind a trait object.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Implementation::Value {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn kind(&self) -> RegistrationKind {
        match self {
            Implementation::Constructor { .. } => RegistrationKind::Constructor,
            Implementation::Function { .. } => RegistrationKind::Function,
            Implementation::Value { .. } => RegistrationKind::Value,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Implementation::Constructor { type_name, .. }
            | Implementation::Function { type_name, .. }
            | Implementation::Value { type_name, .. } => type_name,
        }
    }

    /// Compiles to a lazy factory that resolves `deps` through the calling provider.
    pub(crate) fn into_factory(self, identifier: Identifier, deps: Vec<Dependency>) -> Factory {
        match self {
            // Values take no arguments
            Implementation::Value { value, .. } => {
                Arc::new(move |_: &ServiceProvider| -> DiResult<AnyArc> { Ok(value.clone()) })
            }
            Implementation::Constructor { construct: call, .. } | Implementation::Function { call, .. } => {
                Arc::new(move |provider: &ServiceProvider| -> DiResult<AnyArc> {
                    let args = Arguments::resolve(provider, &identifier, &deps)?;
                    call(&args)
                })
            }
        }
    }
}

/// One positional dependency of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Resolved with `get`.
    One(Identifier),
    /// Resolved with `get_all`: every variant of the family in the resolving scope.
    All(Identifier),
}

impl Dependency {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Dependency::One(Identifier::of::<T>())
    }

    pub fn all(identifier: impl Into<Identifier>) -> Self {
        Dependency::All(identifier.into())
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            Dependency::One(identifier) | Dependency::All(identifier) => identifier,
        }
    }
}

impl From<Identifier> for Dependency {
    fn from(identifier: Identifier) -> Self {
        Dependency::One(identifier)
    }
}

/// A resolved positional argument.
#[derive(Clone)]
pub enum Argument {
    One(AnyArc),
    All(BTreeMap<Arc<str>, AnyArc>),
}

/// Resolved dependencies handed to a constructor, in declaration order.
pub struct Arguments {
    service: Identifier,
    values: Vec<(Identifier, Argument)>,
}

impl Arguments {
    pub(crate) fn resolve(provider: &ServiceProvider, service: &Identifier, deps: &[Dependency]) -> DiResult<Self> {
        let mut values = Vec::with_capacity(deps.len());
        for dep in deps {
            let argument = match dep {
                Dependency::One(identifier) => Argument::One(provider.get_any(identifier)?),
                Dependency::All(identifier) => Argument::All(provider.get_all_any(identifier)?),
            };
            values.push((dep.identifier().clone(), argument));
        }
        Ok(Self {
            service: service.clone(),
            values,
        })
    }

    /// The service these arguments are being resolved for.
    pub fn service(&self) -> &Identifier {
        &self.service
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn raw(&self, index: usize) -> Option<&Argument> {
        self.values.get(index).map(|(_, argument)| argument)
    }

    /// Single dependency at `index`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        let (identifier, value) = self.one(index)?;
        downcast(identifier, value.clone())
    }

    /// Single trait-object dependency at `index`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let (identifier, value) = self.one(index)?;
        downcast_trait(identifier, value.clone())
    }

    /// Variant map dependency at `index`.
    pub fn all<T: Any + Send + Sync>(&self, index: usize) -> DiResult<BTreeMap<Arc<str>, Arc<T>>> {
        let (identifier, values) = self.many(index)?;
        values
            .iter()
            .map(|(variant, value)| -> DiResult<(Arc<str>, Arc<T>)> {
                Ok((variant.clone(), downcast(&identifier.variant(variant.clone()), value.clone())?))
            })
            .collect()
    }

    /// Variant map of trait objects at `index`.
    pub fn all_trait<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> DiResult<BTreeMap<Arc<str>, Arc<T>>> {
        let (identifier, values) = self.many(index)?;
        values
            .iter()
            .map(|(variant, value)| -> DiResult<(Arc<str>, Arc<T>)> {
                Ok((
                    variant.clone(),
                    downcast_trait(&identifier.variant(variant.clone()), value.clone())?,
                ))
            })
            .collect()
    }

    fn entry(&self, index: usize) -> DiResult<&(Identifier, Argument)> {
        self.values.get(index).ok_or_else(|| DiError::InvalidArgument {
            identifier: self.service.clone(),
            index,
            reason: "no dependency declared at this position",
        })
    }

    fn one(&self, index: usize) -> DiResult<(&Identifier, &AnyArc)> {
        match self.entry(index)? {
            (identifier, Argument::One(value)) => Ok((identifier, value)),
            (_, Argument::All(_)) => Err(DiError::InvalidArgument {
                identifier: self.service.clone(),
                index,
                reason: "declared as a variant map, not a single service",
            }),
        }
    }

    fn many(&self, index: usize) -> DiResult<(&Identifier, &BTreeMap<Arc<str>, AnyArc>)> {
        match self.entry(index)? {
            (identifier, Argument::All(values)) => Ok((identifier, values)),
            (_, Argument::One(_)) => Err(DiError::InvalidArgument {
                identifier: self.service.clone(),
                index,
                reason: "declared as a single service, not a variant map",
            }),
        }
    }
}
