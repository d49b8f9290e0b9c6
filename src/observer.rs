//! Diagnostic observers for dependency injection traceability.
//!
//! Observers are hooks called synchronously around every factory invocation.
//! They never see cache hits, only real constructions and their failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::identifier::Identifier;
use crate::scope::Scope;

/// Observer trait for resolution events.
///
/// Register observers on the [`Container`](crate::Container); every provider
/// built afterwards reports to them. Keep implementations cheap: they run
/// inline with resolution.
///
/// # Examples
///
/// ```
/// use tiered_di::{Container, DiError, DiObserver, Identifier, Scope};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     built: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, _identifier: &Identifier, _scope: &Scope) {}
///
///     fn resolved(&self, identifier: &Identifier, scope: &Scope, _duration: Duration) {
///         self.built.lock().unwrap().push(format!("{scope}:{identifier}"));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let mut container = Container::new();
/// container.add_observer(recorder.clone());
/// container.add_value(Identifier::new("Zoom"), 1.5f32, Default::default())?;
///
/// container.root_provider().get_any(&Identifier::new("Zoom"))?;
/// assert_eq!(*recorder.built.lock().unwrap(), ["root:Zoom"]);
/// # Ok::<(), DiError>(())
/// ```
pub trait DiObserver: Send + Sync {
    /// Called right before a factory runs.
    fn resolving(&self, identifier: &Identifier, scope: &Scope);

    /// Called after a factory returned an instance that is now cached.
    fn resolved(&self, identifier: &Identifier, scope: &Scope, duration: Duration);

    /// Called when a factory returned an error.
    fn failed(&self, identifier: &Identifier, scope: &Scope, error: &DiError) {
        let _ = (identifier, scope, error);
    }
}

/// Observers shared by a container and the providers it builds.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, identifier: &Identifier, scope: &Scope) {
        for observer in &self.observers {
            observer.resolving(identifier, scope);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, identifier: &Identifier, scope: &Scope, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(identifier, scope, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, identifier: &Identifier, scope: &Scope, error: &DiError) {
        for observer in &self.observers {
            observer.failed(identifier, scope, error);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// Constructions are logged at `DEBUG`, failures at `WARN`, each tagged with
/// the configured prefix. Install any `tracing` subscriber to see them.
///
/// ```
/// use tiered_di::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut container = Container::new();
/// container.add_observer(Arc::new(LoggingObserver::with_prefix("editor-di")));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "tiered-di".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, identifier: &Identifier, scope: &Scope) {
        tracing::debug!(prefix = %self.prefix, identifier = %identifier, scope = %scope, "resolving");
    }

    fn resolved(&self, identifier: &Identifier, scope: &Scope, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, identifier = %identifier, scope = %scope, ?duration, "resolved");
    }

    fn failed(&self, identifier: &Identifier, scope: &Scope, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, identifier = %identifier, scope = %scope, error = %error, "resolution failed");
    }
}

/// Counts constructions, failures and total factory time.
///
/// ```
/// use tiered_di::{Container, Identifier, MetricsObserver};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let mut container = Container::new();
/// container.add_observer(metrics.clone());
/// container.add_value(Identifier::new("Locale"), "en-GB", Default::default()).unwrap();
///
/// let provider = container.root_provider();
/// provider.get_any(&Identifier::new("Locale")).unwrap();
/// provider.get_any(&Identifier::new("Locale")).unwrap(); // cached, not counted
/// assert_eq!(metrics.resolution_count(), 1);
/// ```
#[derive(Default)]
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    failure_count: AtomicU64,
    total_resolution_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_nanos.load(Ordering::Relaxed))
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(self.total_resolution_time() / count as u32)
    }

    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
        self.total_resolution_nanos.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, _identifier: &Identifier, _scope: &Scope) {}

    fn resolved(&self, _identifier: &Identifier, _scope: &Scope, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_resolution_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn failed(&self, _identifier: &Identifier, _scope: &Scope, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}
