#![no_main]

use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;
use tiered_di::{Container, DiError, Identifier, RegistrationOptions, Scope};

const SCOPES: [&str; 3] = ["root", "workspace", "page"];

fuzz_target!(|data: &[u8]| {
    let mut container = Container::new();
    let mut model: HashSet<(usize, u8, u8)> = HashSet::new();

    // Each pair of bytes is one registration: (flags, name/variant)
    for chunk in data.chunks_exact(2) {
        let scope_index = (chunk[0] % 3) as usize;
        let override_existing = chunk[0] & 0x80 != 0;
        let name = chunk[1] >> 4;
        let variant = chunk[1] & 0x03;

        let identifier = if variant == 0 {
            Identifier::new(format!("svc{name}"))
        } else {
            Identifier::with_variant(format!("svc{name}"), format!("v{variant}"))
        };
        let mut options = RegistrationOptions::in_scope(Scope::new(SCOPES[scope_index]));
        options.override_existing = override_existing;

        let key = (scope_index, name, variant);
        let result = container.add_value(identifier, u32::from(chunk[1]), options);
        match result {
            Ok(_) => {
                assert!(override_existing || !model.contains(&key));
                model.insert(key);
            }
            Err(DiError::DuplicateServiceDefinition { .. }) => {
                assert!(!override_existing && model.contains(&key));
            }
            Err(other) => panic!("unexpected registration error: {other}"),
        }
        assert_eq!(container.size(), model.len());
    }

    assert_eq!(container.descriptors().len(), model.len());
});
