//! Service module system for modular registration.
//!
//! Feature modules bundle their registrations so a host can install them as
//! a unit, without reaching into the container beyond the registration
//! surface.

use crate::collection::Container;
use crate::error::DiResult;

/// A module that registers its services with a [`Container`].
///
/// # Example
///
/// ```rust
/// use tiered_di::{Container, ContainerModuleExt, DiResult, Identifier, Implementation, Resolver, Scope, ServiceModule};
///
/// struct SpellcheckModule {
///     language: &'static str,
/// }
///
/// impl ServiceModule for SpellcheckModule {
///     fn register_services(self, container: &mut Container) -> DiResult<()> {
///         container
///             .scope(&Scope::new("document"))
///             .add_value(Identifier::new("Language"), self.language)?
///             .add_impl(
///                 Identifier::new("Dictionary"),
///                 Implementation::function(|args| {
///                     Ok(format!("dictionary-{}", args.get::<&str>(0)?))
///                 }),
///                 &[Identifier::new("Language").into()],
///             )?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut container = Container::new();
/// container.add_module(SpellcheckModule { language: "nl" })?;
///
/// let provider = container.provider(Some(&Scope::new("document")), None);
/// assert_eq!(*provider.get::<String>(&Identifier::new("Dictionary"))?, "dictionary-nl");
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Register this module's services with the container.
    fn register_services(self, container: &mut Container) -> DiResult<()>;
}

/// Consuming form of module registration, for building a container in one
/// expression.
///
/// ```rust
/// use tiered_di::{Container, ContainerExt, DiResult, Identifier, RegistrationOptions, ServiceModule};
///
/// struct Clock;
/// impl ServiceModule for Clock {
///     fn register_services(self, container: &mut Container) -> DiResult<()> {
///         container.add_value(Identifier::new("Tick"), 16u64, RegistrationOptions::default())?;
///         Ok(())
///     }
/// }
///
/// struct Nothing;
/// impl ServiceModule for Nothing {
///     fn register_services(self, _: &mut Container) -> DiResult<()> { Ok(()) }
/// }
///
/// # fn main() -> DiResult<()> {
/// let container = Container::new().with_module(Clock)?.with_module(Nothing)?;
/// assert_eq!(container.size(), 1);
/// # Ok(())
/// # }
/// ```
pub trait ContainerExt {
    fn with_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ContainerExt for Container {
    fn with_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// In-place module registration matching the `&mut Self` chaining of the
/// container's own methods.
pub trait ContainerModuleExt {
    fn add_module<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ContainerModuleExt for Container {
    fn add_module<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        let module_name = std::any::type_name::<M>();
        let before = self.size();
        module.register_services(self)?;
        tracing::debug!(module = module_name, added = self.size() - before, "installed service module");
        Ok(self)
    }
}
