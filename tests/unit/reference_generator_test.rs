// Property-based tests for transaction reference generation
//
// - References follow PREFIX-<epoch millis>-<8 uppercase hex>
// - References drawn concurrently never collide
// - Initiation never stores two rows under one reference

use payconfirm::modules::payments::services::reference_generator::{
    is_well_formed, GenerateReference, ReferenceGenerator,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

proptest! {
    #[test]
    fn test_reference_is_well_formed_for_any_prefix(prefix in "[A-Z0-9]{1,12}") {
        let generator = ReferenceGenerator::new(prefix.clone());
        let reference = generator.generate();
        let expected_start = format!("{}-", prefix);

        prop_assert!(reference.starts_with(&expected_start));
        prop_assert!(is_well_formed(&reference), "malformed: {}", reference);
    }

    #[test]
    fn test_lowercase_or_short_suffix_is_malformed(suffix in "[0-9a-f]{8}") {
        prop_assume!(suffix.chars().any(|c| c.is_ascii_lowercase()));
        let candidate = format!("PAY-1700000000000-{}", suffix);
        prop_assert!(!is_well_formed(&candidate));
    }
}

#[test]
fn test_timestamp_component_is_current() {
    let before = chrono::Utc::now().timestamp_millis();
    let reference = ReferenceGenerator::new("PAY").generate();
    let after = chrono::Utc::now().timestamp_millis();

    let millis: i64 = reference.split('-').nth(1).unwrap().parse().unwrap();
    assert!(millis >= before && millis <= after);
}

#[test]
fn test_concurrent_generation_is_unique() {
    let generator = Arc::new(ReferenceGenerator::new("PAY"));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let generator = generator.clone();
            std::thread::spawn(move || (0..2_000).map(|_| generator.generate()).collect::<Vec<_>>())
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for reference in handle.join().unwrap() {
            assert!(seen.insert(reference.clone()), "duplicate reference {}", reference);
        }
    }
    assert_eq!(seen.len(), 16_000);
}
