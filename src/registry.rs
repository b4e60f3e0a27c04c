//! The process-wide type registry (`spec.md` §4.1).
//!
//! Grounded on `examples/original_source/src/OCType.c`'s `OCRegisterType`:
//! an append-only table, idempotent registration by name, a hard upper
//! bound on the number of distinct types, and constant-time lookup. Per
//! `spec.md` §9's redesign note, the mutable global is replaced with a
//! `OnceLock`-guarded table rather than a raw static, and registration is
//! expected to happen through [`TypeRegistry::register_or_get`] called
//! from each type's lazily-initialized `type_id()` accessor — exactly one
//! registration per type, no matter how many objects of that type exist.

use std::sync::{Mutex, OnceLock};

use crate::error::OCError;
use crate::json::typed::TypedFactory;

/// A registry index. `0` is reserved for "not a type".
pub type TypeId = u32;

/// Sentinel returned when no type matches, or when the registry is full.
pub const NOT_A_TYPE_ID: TypeId = 0;

/// Hard upper bound on the number of distinct registered types, matching
/// the original's 256-entry table.
pub const MAX_TYPES: usize = 256;

struct Entry {
    name: &'static str,
    factory: Option<TypedFactory>,
}

/// The process-wide, append-only `(name, factory)` table.
pub struct TypeRegistry {
    entries: Mutex<Vec<Entry>>,
}

fn registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| TypeRegistry {
        entries: Mutex::new(Vec::with_capacity(16)),
    })
}

impl TypeRegistry {
    /// Registers `name` if it isn't already registered, returning its id
    /// either way (idempotent, per `spec.md` §4.1).
    pub fn register(name: &'static str) -> TypeId {
        Self::register_with_factory(name, None)
    }

    /// Registers `name` with a typed-JSON constructor factory.
    pub fn register_with_factory(name: &'static str, factory: Option<TypedFactory>) -> TypeId {
        let reg = registry();
        let mut entries = reg.entries.lock().expect("type registry mutex poisoned");
        if let Some(pos) = entries.iter().position(|e| e.name == name) {
            return (pos + 1) as TypeId;
        }
        if entries.len() >= MAX_TYPES {
            return NOT_A_TYPE_ID;
        }
        entries.push(Entry { name, factory });
        entries.len() as TypeId
    }

    /// Returns the registered name for `type_id`, if any.
    pub fn name_of(type_id: TypeId) -> Option<&'static str> {
        if type_id == NOT_A_TYPE_ID {
            return None;
        }
        let reg = registry();
        let entries = reg.entries.lock().expect("type registry mutex poisoned");
        entries.get((type_id - 1) as usize).map(|e| e.name)
    }

    /// Returns the typed-JSON factory registered for `type_id`, if any.
    pub fn factory_of(type_id: TypeId) -> Option<TypedFactory> {
        if type_id == NOT_A_TYPE_ID {
            return None;
        }
        let reg = registry();
        let entries = reg.entries.lock().expect("type registry mutex poisoned");
        entries.get((type_id - 1) as usize).and_then(|e| e.factory)
    }

    /// Returns the typed-JSON factory registered for `name`, if any. Used
    /// by the typed-JSON reconstruction entry point (`spec.md` §4.3.2) to
    /// dispatch on the `"type"` tag without a `strcmp` chain.
    pub fn factory_by_name(name: &str) -> Result<TypedFactory, OCError> {
        let reg = registry();
        let entries = reg.entries.lock().expect("type registry mutex poisoned");
        entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.factory)
            .ok_or_else(|| OCError::deserialization(format!("unregistered type \"{name}\"")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let a = TypeRegistry::register("__test_registry_idempotent__");
        let b = TypeRegistry::register("__test_registry_idempotent__");
        assert_eq!(a, b);
        assert_ne!(a, NOT_A_TYPE_ID);
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let a = TypeRegistry::register("__test_registry_distinct_a__");
        let b = TypeRegistry::register("__test_registry_distinct_b__");
        assert_ne!(a, b);
    }

    #[test]
    fn name_of_round_trips() {
        let id = TypeRegistry::register("__test_registry_name_of__");
        assert_eq!(TypeRegistry::name_of(id), Some("__test_registry_name_of__"));
    }

    #[test]
    fn not_a_type_has_no_name() {
        assert_eq!(TypeRegistry::name_of(NOT_A_TYPE_ID), None);
    }
}
