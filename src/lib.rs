//! `octypes` — a portable, reference-counted, polymorphic value runtime.
//!
//! Every value is a handle of type [`OCValue`], a reference-counted trait
//! object implementing [`ValueObj`]. A small registry of concrete types —
//! booleans, numbers, strings, byte buffers, arrays, dictionaries, sets,
//! index containers, and a null singleton — share that one handle type,
//! retain/release semantics, structural equality, deep copy, and typed or
//! untyped JSON (de)serialization.
//!
//! Concrete types are constructed through their own modules (e.g.
//! [`string::OCString::create`]) and always returned as an erased
//! [`OCValue`]; recovering the concrete type goes through
//! `value.as_any().downcast_ref::<T>()`.

pub mod array;
pub mod boolean;
pub mod data;
pub mod dictionary;
pub mod error;
pub mod header;
pub mod indexing;
pub mod json;
pub mod leak;
pub mod math;
pub mod null;
pub mod number;
pub mod registry;
pub mod set;
pub mod string;

pub use array::{array_from_data, data_from_array, Array};
pub use boolean::Boolean;
pub use data::OCData;
pub use dictionary::Dictionary;
pub use error::OCError;
pub use header::{deep_copy, equal, release, retain, retain_count, OCValue, ValueObj};
pub use indexing::{Encoding, IndexArray, IndexPairSet, IndexSet};
pub use json::{from_typed, from_untyped};
pub use null::Null;
pub use number::{Number, NumberType};
pub use set::Set;
pub use string::OCString;

/// Forces registration of every concrete type that carries a typed-JSON
/// factory, grounded on `examples/original_source/src/OCLibrary.c`'s
/// `OCLibraryInitialize()` (which calls `_OCArrayInitialize()`,
/// `_OCNumberInitialize()`, … up front rather than waiting for first
/// construction).
///
/// Without this, a process that deserializes a `{"type":"OCArray",…}`
/// node before it has ever *constructed* an `OCArray` would fail with
/// "unregistered type", because each type's registry entry was previously
/// only a side effect of its lazily-initialized `type_id()` accessor.
/// `spec.md` §4.1 treats deserialization as a "first use" that must
/// trigger registration exactly once, so [`json::typed::from_typed`]
/// calls this once per process before consulting the registry by name.
///
/// Idempotent and safe to call directly; most callers never need to.
pub fn initialize() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        array::type_id();
        number::type_id();
        data::type_id();
        dictionary::type_id();
        set::type_id();
        indexing::index_set::type_id();
        indexing::index_array::type_id();
        indexing::index_pair_set::type_id();
    });
}
