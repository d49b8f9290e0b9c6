//! Core traits for the dependency injection container.

pub(crate) mod resolver;

pub use resolver::{Resolver, ResolverCore};
