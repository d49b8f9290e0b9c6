#![no_main]

use libfuzzer_sys::fuzz_target;
use tiered_di::{Container, Identifier, RegistrationOptions, Resolver, Scope, ServiceProvider};

const TIERS: [&str; 4] = ["root", "workspace", "page", "editor"];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // data[0] decides how many tiers are wired into the provider chain;
    // every following byte registers one service in some tier.
    let wired = (data[0] % 4) as usize + 1;
    let mut container = Container::new();
    for byte in &data[1..] {
        let name = byte & 0x0f;
        let tier = ((byte >> 4) % 4) as usize;
        let options = RegistrationOptions::in_scope(Scope::new(TIERS[tier]));
        let _ = container.add_value(Identifier::new(format!("svc{name}")), tier as u8, options);
    }

    let mut chain: Option<ServiceProvider> = None;
    for tier in TIERS.iter().take(wired) {
        chain = Some(container.provider(Some(&Scope::new(*tier)), chain.as_ref()));
    }
    let Some(leaf) = chain else { return };

    for name in 0..16u8 {
        let identifier = Identifier::new(format!("svc{name}"));
        // The innermost wired tier that defines the service answers
        let expected = (0..wired)
            .rev()
            .find(|t| container.contains(&identifier, &Scope::new(TIERS[*t])));
        match (leaf.get::<u8>(&identifier), expected) {
            (Ok(value), Some(tier)) => assert_eq!(*value as usize, tier),
            (Err(err), None) => assert!(err.is_missing()),
            (result, expected) => panic!("tier {expected:?} resolved to {result:?}"),
        }
    }
});
