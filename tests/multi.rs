use std::sync::Arc;

use tiered_di::{
    Arguments, Container, Dependency, DiError, DiResult, Identifier, Implementation, Injectable, Resolver, Scope,
};

trait Port: Send + Sync {
    fn label(&self) -> String;
}

struct TypeA;
impl Port for TypeA {
    fn label(&self) -> String {
        "A".to_string()
    }
}

struct TypeC;
impl Port for TypeC {
    fn label(&self) -> String {
        "C".to_string()
    }
}

struct PC {
    primary: Arc<dyn Port>,
    ports: Vec<Arc<dyn Port>>,
}

impl Injectable for PC {
    fn inject(args: &Arguments) -> DiResult<Self> {
        Ok(PC {
            primary: args.get_trait(0)?,
            ports: args.all_trait::<dyn Port>(1)?.into_values().collect(),
        })
    }
}

fn port() -> Identifier {
    Identifier::new("Port")
}

fn port_container() -> Container {
    let mut container = Container::new();
    container
        .add_impl(
            port().variant("A"),
            Implementation::function(|_| Ok(Arc::new(TypeA) as Arc<dyn Port>)),
            &[],
        )
        .unwrap()
        .add_impl(
            port().variant("C"),
            Implementation::function(|_| Ok(Arc::new(TypeC) as Arc<dyn Port>)),
            &[],
        )
        .unwrap()
        .add::<PC>(&[port().variant("A").into(), Dependency::all(port())])
        .unwrap();
    container
}

#[test]
fn test_collector_receives_every_variant() {
    let container = port_container();
    let provider = container.root_provider();

    let pc = provider.get_of::<PC>().unwrap();
    assert_eq!(pc.ports.len(), 2);
    assert_eq!(pc.primary.label(), "A");

    let labels: Vec<String> = pc.ports.iter().map(|p| p.label()).collect();
    assert_eq!(labels, ["A", "C"]);
}

#[test]
fn test_variants_are_shared_with_single_lookups() {
    let container = port_container();
    let provider = container.root_provider();

    let pc = provider.get_of::<PC>().unwrap();
    let a = provider.get_trait::<dyn Port>(&port().variant("A")).unwrap();
    assert!(Arc::ptr_eq(&pc.primary, &a));
    assert!(Arc::ptr_eq(&pc.ports[0], &a));
}

#[test]
fn test_get_all_maps_variant_to_instance() {
    let container = port_container();
    let provider = container.root_provider();

    let ports = provider.get_all_trait::<dyn Port>(&port()).unwrap();
    assert_eq!(ports.len(), 2);
    assert_eq!(ports["A"].label(), "A");
    assert_eq!(ports["C"].label(), "C");

    // Each variant is cached individually and resolvable on its own
    assert_eq!(provider.cached_len(), 2);
    let again = provider.get_all_trait::<dyn Port>(&port()).unwrap();
    assert!(Arc::ptr_eq(&ports["C"], &again["C"]));
    let c = provider.get_trait::<dyn Port>(&port().variant("C")).unwrap();
    assert!(Arc::ptr_eq(&ports["C"], &c));
}

#[test]
fn test_default_variant_is_part_of_the_family() {
    let mut container = Container::new();
    container
        .add_impl(Identifier::new("Shortcut"), Implementation::value("ctrl+s"), &[])
        .unwrap()
        .add_impl(Identifier::new("Shortcut").variant("mac"), Implementation::value("cmd+s"), &[])
        .unwrap();

    let provider = container.root_provider();
    let all = provider.get_all::<&str>(&Identifier::new("Shortcut")).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(*all[tiered_di::DEFAULT_VARIANT], "ctrl+s");
    assert_eq!(*all["mac"], "cmd+s");

    // Asking for the family by any of its variants yields the same map
    let via_variant = provider.get_all::<&str>(&Identifier::new("Shortcut").variant("mac")).unwrap();
    assert_eq!(via_variant.len(), 2);
}

#[test]
fn test_get_all_empty_family() {
    let container = Container::new();
    let provider = container.root_provider();
    assert!(provider.get_all_any(&Identifier::new("Nothing")).unwrap().is_empty());
}

#[test]
fn test_get_all_only_sees_own_scope_variants() {
    let page = Scope::new("page");
    let mut container = Container::new();
    container
        .add_impl(port().variant("root-only"), Implementation::value(0u8), &[])
        .unwrap();
    container.scope(&page).add_value(port().variant("page-only"), 1u8).unwrap();

    let root = container.root_provider();
    let page_provider = container.provider(Some(&page), Some(&root));

    // The page scope has its own variants, so the parent is not merged in
    let ports = page_provider.get_all::<u8>(&port()).unwrap();
    assert_eq!(ports.keys().map(|k| &**k).collect::<Vec<_>>(), ["page-only"]);
}

#[test]
fn test_get_all_propagates_variant_failure() {
    let mut container = Container::new();
    container
        .add_impl(port().variant("ok"), Implementation::value(1u8), &[])
        .unwrap()
        .add_impl(
            port().variant("broken"),
            Implementation::function(|args| Ok(*args.get::<u8>(0)?)),
            &[Identifier::new("Missing").into()],
        )
        .unwrap();

    let provider = container.root_provider();
    let err = provider.get_all::<u8>(&port()).unwrap_err();
    assert!(matches!(err, DiError::MissingDependency { .. }));
}

#[test]
fn test_wrong_argument_shape() {
    let mut container = Container::new();
    container
        .add_impl(port().variant("A"), Implementation::value(1u8), &[])
        .unwrap()
        .add_impl(
            Identifier::new("Reader"),
            Implementation::function(|args| Ok(*args.get::<u8>(0)?)),
            &[Dependency::all(port())],
        )
        .unwrap();

    let err = container.root_provider().get_any(&Identifier::new("Reader")).unwrap_err();
    assert!(matches!(err, DiError::InvalidArgument { index: 0, .. }));
}
