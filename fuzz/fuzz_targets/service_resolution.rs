#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use tiered_di::{Container, Dependency, DiError, Identifier, Implementation, Scope};

fn node(index: u8) -> Identifier {
    Identifier::new(format!("node{index}"))
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte: node count; then each byte lists up to two edges of one node.
    // Edges may point at unregistered nodes or form cycles.
    let count = (data[0] % 16) + 1;
    let mut container = Container::new();
    for (index, edges) in data[1..].iter().take(count as usize).enumerate() {
        let deps: Vec<Dependency> = [edges & 0x1f, edges >> 5]
            .into_iter()
            .filter(|target| *target != 0)
            .map(|target| node(target - 1).into())
            .collect();
        let arity = deps.len();
        let implementation = Implementation::function(move |args| Ok(args.len() == arity));
        if container.add_impl(node(index as u8), implementation, &deps).is_err() {
            return;
        }
    }

    let provider = container.root_provider();
    for index in 0..count + 2 {
        let identifier = node(index);
        match provider.get_any(&identifier) {
            Ok(first) => {
                let second = provider.get_any(&identifier).expect("cached resolution");
                assert!(Arc::ptr_eq(&first, &second));
            }
            Err(DiError::ServiceNotFound { identifier: missing }) => assert_eq!(missing, identifier),
            Err(DiError::MissingDependency { .. }) | Err(DiError::CircularDependency { .. }) => {
                assert!(container.contains(&identifier, &Scope::root()));
            }
            Err(other) => panic!("unexpected resolution error: {other}"),
        }
    }
});
