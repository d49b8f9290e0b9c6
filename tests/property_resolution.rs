//! Property-based tests for service resolution
//!
//! These tests verify caching, laziness and error classification over
//! arbitrary dependency graphs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use tiered_di::{Container, Dependency, DiError, Identifier, Implementation, Resolver, Scope, MAX_RESOLUTION_DEPTH};

fn node(index: usize) -> Identifier {
    Identifier::new(format!("n{index}"))
}

/// Registers nodes `0..count`; node `i` depends on the listed targets.
/// Targets at or above `count` are left unregistered.
fn build(count: usize, edges: &[Vec<usize>], calls: &Arc<AtomicUsize>) -> Container {
    let mut container = Container::new();
    for (index, targets) in edges.iter().enumerate().take(count) {
        let deps: Vec<Dependency> = targets.iter().map(|t| node(*t).into()).collect();
        let counter = calls.clone();
        container
            .add_impl(
                node(index),
                Implementation::function(move |args| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(args.len())
                }),
                &deps,
            )
            .expect("distinct nodes");
    }
    container
}

fn graph() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (1usize..10).prop_flat_map(|count| {
        let edges = prop::collection::vec(prop::collection::vec(0usize..count + 2, 0..3), count);
        (Just(count), edges)
    })
}

proptest! {
    #[test]
    fn each_factory_runs_at_most_once((count, edges) in graph()) {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = build(count, &edges, &calls);
        let provider = container.root_provider();

        for round in 0..2 {
            for index in 0..count {
                let _ = provider.get_any(&node(index));
            }
            let after = calls.load(Ordering::SeqCst);
            prop_assert!(after <= count, "round {} ran {} factories for {} nodes", round, after, count);
        }
        prop_assert_eq!(provider.cached_len(), calls.load(Ordering::SeqCst));
    }
}

proptest! {
    #[test]
    fn successful_resolution_is_stable((count, edges) in graph()) {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = build(count, &edges, &calls);
        let provider = container.root_provider();

        for index in 0..count {
            if let Ok(first) = provider.get_any(&node(index)) {
                let second = provider.get_any(&node(index)).unwrap();
                prop_assert!(Arc::ptr_eq(&first, &second));
                prop_assert!(provider.has(&node(index)));
            }
        }
    }
}

proptest! {
    #[test]
    fn errors_are_classified((count, edges) in graph()) {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = build(count, &edges, &calls);
        let provider = container.root_provider();

        for index in 0..count + 2 {
            match provider.get_any(&node(index)) {
                Ok(_) => prop_assert!(index < count),
                Err(DiError::ServiceNotFound { identifier }) => {
                    prop_assert!(index >= count);
                    prop_assert_eq!(identifier, node(index));
                }
                Err(DiError::MissingDependency { identifier, .. }) => {
                    prop_assert!(index < count);
                    prop_assert!(!container.contains(&identifier, &Scope::root()));
                }
                Err(DiError::CircularDependency { path, .. }) => {
                    let (last, earlier) = path.split_last().expect("non-empty path");
                    prop_assert!(earlier.contains(last));
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}

proptest! {
    #[test]
    fn chains_fail_exactly_past_the_ceiling(length in 1usize..130) {
        // link0 -> link1 -> ... -> link{length - 1}, the last one a value
        let mut container = Container::new();
        for i in 0..length - 1 {
            container
                .add_impl(
                    Identifier::new(format!("link{i}")),
                    Implementation::function(|args| Ok(*args.get::<usize>(0)? + 1)),
                    &[Identifier::new(format!("link{}", i + 1)).into()],
                )
                .unwrap();
        }
        container
            .add_impl(Identifier::new(format!("link{}", length - 1)), Implementation::value(0usize), &[])
            .unwrap();

        let result = container.root_provider().get::<usize>(&Identifier::new("link0"));
        if length <= MAX_RESOLUTION_DEPTH {
            prop_assert_eq!(*result.unwrap(), length - 1);
        } else {
            let is_limit = matches!(result, Err(DiError::RecursionLimit { .. }));
            prop_assert!(is_limit);
        }
    }
}
