use std::sync::{Arc, Mutex};
use std::time::Duration;

use tiered_di::{
    Container, DiError, DiObserver, Identifier, Implementation, LoggingObserver, MetricsObserver, RegistrationOptions,
    Resolver, Scope,
};

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl DiObserver for EventLog {
    fn resolving(&self, identifier: &Identifier, scope: &Scope) {
        self.events.lock().unwrap().push(format!("resolving {identifier} in {scope}"));
    }

    fn resolved(&self, identifier: &Identifier, scope: &Scope, _duration: Duration) {
        self.events.lock().unwrap().push(format!("resolved {identifier} in {scope}"));
    }

    fn failed(&self, identifier: &Identifier, _scope: &Scope, error: &DiError) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed {identifier}: {}", error.identifier()));
    }
}

#[test]
fn test_observer_sees_nested_constructions_in_order() {
    let log = Arc::new(EventLog::default());
    let mut container = Container::new();
    container.add_observer(log.clone());
    container
        .add_value(Identifier::new("Inner"), 1u8, RegistrationOptions::default())
        .unwrap()
        .add_impl(
            Identifier::new("Outer"),
            Implementation::function(|args| Ok(*args.get::<u8>(0)? + 1)),
            &[Identifier::new("Inner").into()],
        )
        .unwrap();

    let provider = container.root_provider();
    provider.get::<u8>(&Identifier::new("Outer")).unwrap();

    assert_eq!(
        log.take(),
        [
            "resolving Outer in root",
            "resolving Inner in root",
            "resolved Inner in root",
            "resolved Outer in root",
        ]
    );

    // Cache hits are silent
    provider.get::<u8>(&Identifier::new("Outer")).unwrap();
    assert!(log.take().is_empty());
}

#[test]
fn test_observer_sees_failures() {
    let log = Arc::new(EventLog::default());
    let mut container = Container::new();
    container.add_observer(log.clone());
    container
        .add_impl(
            Identifier::new("Outer"),
            Implementation::function(|args| Ok(*args.get::<u8>(0)?)),
            &[Identifier::new("Missing").into()],
        )
        .unwrap();

    let provider = container.root_provider();
    assert!(provider.get_any(&Identifier::new("Outer")).is_err());

    assert_eq!(log.take(), ["resolving Outer in root", "failed Outer: Missing"]);
}

#[test]
fn test_delegated_constructions_report_parent_scope() {
    let log = Arc::new(EventLog::default());
    let workspace = Scope::new("workspace");
    let page = Scope::child_of("page", &workspace);

    let mut container = Container::new();
    container.add_observer(log.clone());
    container.scope(&workspace).add_value(Identifier::new("Layout"), "grid").unwrap();

    let workspace_provider = container.provider(Some(&workspace), None);
    let page_provider = container.provider(Some(&page), Some(&workspace_provider));
    page_provider.get_any(&Identifier::new("Layout")).unwrap();

    assert_eq!(
        log.take(),
        ["resolving Layout in workspace", "resolved Layout in workspace"]
    );
}

#[test]
fn test_observers_apply_to_later_providers_only() {
    let metrics = Arc::new(MetricsObserver::new());
    let mut container = Container::new();
    container
        .add_value(Identifier::new("Tick"), 16u64, RegistrationOptions::default())
        .unwrap();

    let before = container.root_provider();
    container.add_observer(metrics.clone());
    let after = container.root_provider();

    before.get_any(&Identifier::new("Tick")).unwrap();
    assert_eq!(metrics.resolution_count(), 0);

    after.get_any(&Identifier::new("Tick")).unwrap();
    assert_eq!(metrics.resolution_count(), 1);
}

#[test]
fn test_metrics_observer_counts() {
    let metrics = Arc::new(MetricsObserver::new());
    let mut container = Container::new();
    container.add_observer(metrics.clone());
    container
        .add_value(Identifier::new("A"), 1u8, RegistrationOptions::default())
        .unwrap()
        .add_value(Identifier::new("B"), 2u8, RegistrationOptions::default())
        .unwrap()
        .add_factory::<u8, _>(
            Identifier::new("Broken"),
            |_| Err(DiError::factory(Identifier::new("Broken"), "no device")),
            RegistrationOptions::default(),
        )
        .unwrap();

    let provider = container.root_provider();
    provider.get_any(&Identifier::new("A")).unwrap();
    provider.get_any(&Identifier::new("B")).unwrap();
    provider.get_any(&Identifier::new("A")).unwrap();
    assert!(provider.get_any(&Identifier::new("Broken")).is_err());
    // Not found never reaches a factory
    assert!(provider.get_any(&Identifier::new("Ghost")).is_err());

    assert_eq!(metrics.resolution_count(), 2);
    assert_eq!(metrics.failure_count(), 1);
    assert!(metrics.average_resolution_time().is_some());
}

#[test]
fn test_logging_observer_is_silent_without_subscriber() {
    let mut container = Container::new();
    container.add_observer(Arc::new(LoggingObserver::with_prefix("test")));
    container
        .add_value(Identifier::new("A"), 1u8, RegistrationOptions::default())
        .unwrap();

    let provider = container.root_provider();
    assert_eq!(*provider.get::<u8>(&Identifier::new("A")).unwrap(), 1);
    assert_eq!(LoggingObserver::default().prefix(), "tiered-di");
}
