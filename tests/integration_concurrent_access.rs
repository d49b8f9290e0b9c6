//! Concurrent access integration tests
//!
//! Providers and their cached instances are `Send + Sync`. Each thread keeps
//! its own resolution stack, so cold lookups from several threads through one
//! provider neither collide nor report false cycles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tiered_di::{Container, DiError, Identifier, Implementation, RegistrationOptions, Resolver, Scope, ServiceProvider};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_public_handles_are_send_and_sync() {
    assert_send_sync::<Container>();
    assert_send_sync::<ServiceProvider>();
}

#[test]
fn test_primed_cache_is_shared_across_threads() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let mut container = Container::new();
    container
        .add_factory(
            Identifier::new("Palette"),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(vec!["red", "green", "blue"])
            },
            RegistrationOptions::default(),
        )
        .unwrap();

    let provider = container.root_provider();
    let primed = provider.get::<Vec<&str>>(&Identifier::new("Palette")).unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..100)
                    .map(|_| provider.get::<Vec<&str>>(&Identifier::new("Palette")).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for palette in handle.join().unwrap() {
            assert!(Arc::ptr_eq(&palette, &primed));
        }
    }
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_provider_per_thread_over_shared_parent() {
    let workspace = Scope::new("workspace");
    let page = Scope::child_of("page", &workspace);

    let mut container = Container::new();
    container.scope(&workspace).add_value(Identifier::new("Layout"), "grid").unwrap();
    container
        .scope(&page)
        .add_factory(Identifier::new("PageId"), |_| Ok(thread::current().id()))
        .unwrap();

    let container = Arc::new(container);
    let workspace_provider = container.provider(Some(&workspace), None);
    let layout = workspace_provider.get::<&str>(&Identifier::new("Layout")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let container = container.clone();
            let parent = workspace_provider.clone();
            let page = page.clone();
            thread::spawn(move || {
                let provider = container.provider(Some(&page), Some(&parent));
                let id = provider.get::<thread::ThreadId>(&Identifier::new("PageId")).unwrap();
                let layout = provider.get::<&str>(&Identifier::new("Layout")).unwrap();
                (*id == thread::current().id(), layout)
            })
        })
        .collect();

    for handle in handles {
        let (own_thread, thread_layout) = handle.join().unwrap();
        assert!(own_thread);
        assert!(Arc::ptr_eq(&thread_layout, &layout));
    }
}

#[test]
fn test_concurrent_cold_resolution_is_not_circular() {
    let mut container = Container::new();
    container
        .add_factory(
            Identifier::new("Indexer"),
            |_| {
                thread::sleep(Duration::from_millis(200));
                Ok(String::from("indexed"))
            },
            RegistrationOptions::default(),
        )
        .unwrap()
        .add_impl(
            Identifier::new("Search"),
            Implementation::function(|args| Ok(args.get::<String>(0)?.len())),
            &[Identifier::new("Indexer").into()],
        )
        .unwrap();

    let provider = container.root_provider();
    let background = {
        let provider = provider.clone();
        thread::spawn(move || provider.get::<usize>(&Identifier::new("Search")))
    };
    thread::sleep(Duration::from_millis(50));

    // The background thread is still inside Indexer's factory
    let foreground = provider.get::<usize>(&Identifier::new("Search")).unwrap();
    let background = background.join().unwrap().unwrap();

    assert_eq!(*foreground, 7);
    assert!(Arc::ptr_eq(&foreground, &background));
    assert_eq!(provider.cached_len(), 2);
}

#[test]
fn test_interleaved_failures_leave_other_threads_intact() {
    let mut container = Container::new();
    container
        .add_impl(
            Identifier::new("Loop"),
            Implementation::function(|args| Ok(args.len())),
            &[Identifier::new("Loop").into()],
        )
        .unwrap()
        .add_factory(
            Identifier::new("Slow"),
            |_| {
                thread::sleep(Duration::from_millis(100));
                Ok(1u8)
            },
            RegistrationOptions::default(),
        )
        .unwrap();

    let provider = container.root_provider();
    let slow = {
        let provider = provider.clone();
        thread::spawn(move || provider.get::<u8>(&Identifier::new("Slow")))
    };
    thread::sleep(Duration::from_millis(20));
    for _ in 0..10 {
        let err = provider.get_any(&Identifier::new("Loop")).unwrap_err();
        match err {
            DiError::CircularDependency { path, .. } => assert_eq!(path.len(), 2),
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    assert_eq!(*slow.join().unwrap().unwrap(), 1);
}
