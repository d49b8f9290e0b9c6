//! Error types for the dependency injection container.

use std::sync::Arc;

use crate::identifier::Identifier;

/// Dependency injection errors.
///
/// Every variant is a configuration error: it is returned synchronously from
/// the call that triggered it and is never retried internally. A failed
/// resolution caches nothing, so fixing the registration and calling again
/// succeeds.
///
/// # Examples
///
/// ```rust
/// use tiered_di::{Container, DiError, Identifier};
///
/// let container = Container::new();
/// let provider = container.root_provider();
///
/// match provider.get_any(&Identifier::new("Clipboard")) {
///     Err(DiError::ServiceNotFound { identifier }) => {
///         assert_eq!(identifier.name(), "Clipboard");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// The requested identifier is not reachable through the scope/parent chain.
    #[error("Service not found: {identifier}")]
    ServiceNotFound { identifier: Identifier },

    /// A dependency of a registered service is itself unregistered.
    #[error("Missing dependency: {identifier} (required by {dependent})")]
    MissingDependency {
        identifier: Identifier,
        dependent: Identifier,
    },

    /// The identifier is already under construction on the resolution stack.
    #[error("Circular dependency: {}", join_path(.path))]
    CircularDependency {
        identifier: Identifier,
        path: Vec<Identifier>,
    },

    /// A `(scope, identifier, variant)` triple was registered twice without override.
    #[error("Duplicate service definition: {identifier} in scope '{scope}'")]
    DuplicateServiceDefinition {
        scope: Arc<str>,
        identifier: Identifier,
    },

    /// The resolution stack grew past the fixed ceiling.
    #[error("Max depth {depth} exceeded while resolving {identifier}")]
    RecursionLimit { identifier: Identifier, depth: usize },

    /// The resolved instance is not of the requested Rust type.
    #[error("Type mismatch for {identifier}: expected {expected}")]
    TypeMismatch {
        identifier: Identifier,
        expected: &'static str,
    },

    /// A constructor asked for a positional argument that is absent or has the wrong shape.
    #[error("Invalid argument #{index} for {identifier}: {reason}")]
    InvalidArgument {
        identifier: Identifier,
        index: usize,
        reason: &'static str,
    },

    /// A factory reported its own failure.
    #[error("Factory for {identifier} failed: {message}")]
    FactoryFailed {
        identifier: Identifier,
        message: String,
    },
}

impl DiError {
    /// Wraps a failure raised inside a factory.
    pub fn factory(identifier: Identifier, message: impl Into<String>) -> Self {
        DiError::FactoryFailed {
            identifier,
            message: message.into(),
        }
    }

    /// The identifier this error is about.
    pub fn identifier(&self) -> &Identifier {
        match self {
            DiError::ServiceNotFound { identifier }
            | DiError::MissingDependency { identifier, .. }
            | DiError::CircularDependency { identifier, .. }
            | DiError::DuplicateServiceDefinition { identifier, .. }
            | DiError::RecursionLimit { identifier, .. }
            | DiError::TypeMismatch { identifier, .. }
            | DiError::InvalidArgument { identifier, .. }
            | DiError::FactoryFailed { identifier, .. } => identifier,
        }
    }

    /// True for the "nothing registered" family (`ServiceNotFound`, `MissingDependency`).
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            DiError::ServiceNotFound { .. } | DiError::MissingDependency { .. }
        )
    }
}

fn join_path(path: &[Identifier]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for DI operations.
///
/// ```rust
/// use tiered_di::{DiResult, DiError, Identifier};
///
/// fn lookup(registered: bool) -> DiResult<u32> {
///     if registered {
///         Ok(7)
///     } else {
///         Err(DiError::ServiceNotFound { identifier: Identifier::new("Ruler") })
///     }
/// }
///
/// assert!(lookup(true).is_ok());
/// assert!(lookup(false).unwrap_err().is_missing());
/// ```
pub type DiResult<T> = Result<T, DiError>;
