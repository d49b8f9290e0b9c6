//! # tiered-di
//!
//! Scoped dependency injection with lazy graph resolution: a [`Container`]
//! holds service definitions, and a [`ServiceProvider`] bound to one scope
//! turns them into cached instances on demand.
//!
//! ## Features
//!
//! - **Lazy factories**: registration never runs user code; each factory runs
//!   at most once per provider
//! - **Variants**: several implementations of one identifier family,
//!   resolvable one by one or all at once
//! - **Nested lifetime tiers**: a provider delegates whatever its own scope
//!   lacks to an explicitly wired parent provider
//! - **Precise failures**: missing service, missing dependency, circular
//!   dependency, duplicate definition and recursion limit are distinct errors
//! - **Explicit registration kinds**: constructor, function or plain value
//!
//! ## Quick Start
//!
//! ```rust
//! use tiered_di::{Arguments, Container, Dependency, DiResult, Injectable, Resolver};
//! use std::sync::Arc;
//!
//! struct A { value: String }
//! impl Injectable for A {
//!     fn inject(_: &Arguments) -> DiResult<Self> {
//!         Ok(A { value: "hello world".to_string() })
//!     }
//! }
//!
//! struct B { a: Arc<A> }
//! impl Injectable for B {
//!     fn inject(args: &Arguments) -> DiResult<Self> {
//!         Ok(B { a: args.get(0)? })
//!     }
//! }
//!
//! struct C { b: Arc<B> }
//! impl Injectable for C {
//!     fn inject(args: &Arguments) -> DiResult<Self> {
//!         Ok(C { b: args.get(0)? })
//!     }
//! }
//!
//! let mut container = Container::new();
//! container
//!     .add::<A>(&[])?
//!     .add::<B>(&[Dependency::of::<A>()])?
//!     .add::<C>(&[Dependency::of::<B>()])?;
//!
//! let provider = container.root_provider();
//! let c = provider.get_of::<C>()?;
//! assert_eq!(c.b.a.value, "hello world");
//!
//! // Instances are cached for the provider's lifetime
//! assert!(Arc::ptr_eq(&c, &provider.get_of::<C>()?));
//! # Ok::<(), tiered_di::DiError>(())
//! ```
//!
//! ## Variants
//!
//! ```rust
//! use tiered_di::{Container, Dependency, Identifier, Implementation, Resolver};
//! use std::sync::Arc;
//!
//! trait Port: Send + Sync {
//!     fn label(&self) -> &'static str;
//! }
//! struct TypeA;
//! impl Port for TypeA { fn label(&self) -> &'static str { "A" } }
//! struct TypeC;
//! impl Port for TypeC { fn label(&self) -> &'static str { "C" } }
//!
//! struct PortCollector {
//!     primary: Arc<dyn Port>,
//!     ports: Vec<Arc<dyn Port>>,
//! }
//!
//! let port = Identifier::new("Port");
//! let mut container = Container::new();
//! container
//!     .add_impl(port.variant("A"), Implementation::value(Arc::new(TypeA) as Arc<dyn Port>), &[])?
//!     .add_impl(port.variant("C"), Implementation::value(Arc::new(TypeC) as Arc<dyn Port>), &[])?
//!     .add_impl(
//!         Identifier::new("PortCollector"),
//!         Implementation::function(|args| {
//!             Ok(PortCollector {
//!                 primary: args.get_trait::<dyn Port>(0)?,
//!                 ports: args.all_trait::<dyn Port>(1)?.into_values().collect(),
//!             })
//!         }),
//!         &[port.variant("A").into(), Dependency::all(port.clone())],
//!     )?;
//!
//! let provider = container.root_provider();
//! let collector = provider.get::<PortCollector>(&Identifier::new("PortCollector"))?;
//! assert_eq!(collector.primary.label(), "A");
//! assert_eq!(collector.ports.len(), 2);
//! # Ok::<(), tiered_di::DiError>(())
//! ```
//!
//! ## Scopes
//!
//! Scopes tag where a definition lives. A provider only looks at its own
//! scope; reaching an outer tier requires passing the outer provider as the
//! parent, mirroring the host's lifetime hierarchy.
//!
//! ```rust
//! use tiered_di::{Container, DiError, Identifier, Scope, Resolver};
//!
//! let workspace = Scope::new("workspace");
//! let page = Scope::child_of("page", &workspace);
//!
//! let mut container = Container::new();
//! container.scope(&workspace).add_value(Identifier::new("Title"), "notes")?;
//!
//! let workspace_provider = container.provider(Some(&workspace), None);
//! let wired = container.provider(Some(&page), Some(&workspace_provider));
//! assert_eq!(*wired.get::<&str>(&Identifier::new("Title"))?, "notes");
//!
//! // Declaring `workspace` as the page scope's parent does not wire anything
//! let unwired = container.provider(Some(&page), None);
//! assert!(matches!(
//!     unwired.get_any(&Identifier::new("Title")),
//!     Err(DiError::ServiceNotFound { .. })
//! ));
//! # Ok::<(), DiError>(())
//! ```
//!
//! ## Cargo features
//!
//! - `diagnostics`: `to_debug_string` dumps on containers and providers
//! - `parking-lot`: `parking_lot::Mutex` for provider state
//! - `ahash`: faster hashing for the registry and caches
//! - `performance`: both of the above

// Module declarations
pub mod collection;
pub mod descriptors;
pub mod error;
pub mod identifier;
pub mod observer;
pub mod provider;
pub mod scope;
pub mod traits;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use collection::{
    Argument, Arguments, Constructor, Container, ContainerExt, ContainerModuleExt, Dependency, Implementation,
    Injectable, RegistrationOptions, ScopeBuilder, ServiceModule,
};
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult};
pub use identifier::{Identifier, DEFAULT_VARIANT, PROVIDER_NAME};
pub use internal::MAX_RESOLUTION_DEPTH;
pub use observer::{DiObserver, LoggingObserver, MetricsObserver};
pub use provider::ServiceProvider;
pub use registration::{AnyArc, Factory, RegistrationKind};
pub use scope::{Scope, ROOT_SCOPE};
pub use traits::{Resolver, ResolverCore};
