/// Unit tests for Key type methods

use ferrous_kernel::{key_of_type, Key};
use std::any::TypeId;
use std::collections::HashSet;

trait Weapon: Send + Sync {}

mod armory {
    pub struct Sword;
}

#[test]
fn test_key_display_name_type() {
    let key = key_of_type::<String>();
    assert_eq!(key.display_name(), "alloc::string::String");
    assert_eq!(key.to_string(), "alloc::string::String");
}

#[test]
fn test_key_short_name_strips_module_path() {
    assert_eq!(key_of_type::<armory::Sword>().short_name(), "Sword");
    assert_eq!(key_of_type::<u8>().short_name(), "u8");
}

#[test]
fn test_key_short_name_keeps_generic_arguments() {
    let key = key_of_type::<Vec<armory::Sword>>();
    assert!(key.short_name().starts_with("Vec<"));
    assert!(key.short_name().contains("Sword"));
}

#[test]
fn test_key_for_trait_object() {
    let key = key_of_type::<dyn Weapon>();
    assert!(key.is::<dyn Weapon>());
    assert!(!key.is::<armory::Sword>());
    assert_eq!(key.short_name(), "Weapon");
}

#[test]
fn test_key_equality_uses_type_id_only() {
    let a = Key::new(TypeId::of::<u32>(), "u32");
    let b = Key::new(TypeId::of::<u32>(), "an alias");
    let c = Key::new(TypeId::of::<u64>(), "u32");
    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<Key> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_key_type_id_roundtrip() {
    assert_eq!(key_of_type::<String>().type_id(), TypeId::of::<String>());
}
