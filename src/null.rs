//! The null singleton (`spec.md` §3.2/§3.4, component F).
//!
//! Grounded on `examples/original_source/src/OCNull.c`: exactly one
//! process-wide instance with `retainCount` pinned at 0. `OCNull` is
//! also one of the types serialized as native JSON even in typed mode
//! (`spec.md` §4.3.2), so reconstruction never routes through the
//! registry's typed factory — see [`crate::json::untyped`].

use std::any::Any;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::registry::{TypeId, TypeRegistry};

/// The null value object. There is exactly one instance: [`Null::shared`].
#[derive(Debug)]
pub struct Null;

fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register("OCNull"))
}

fn singleton() -> &'static OCValue {
    static SINGLETON: OnceLock<OCValue> = OnceLock::new();
    SINGLETON.get_or_init(|| Rc::new(Null))
}

impl Null {
    /// The singleton null instance. Always the same allocation.
    pub fn shared() -> OCValue {
        Rc::clone(singleton())
    }
}

impl ValueObj for Null {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        other.as_any().downcast_ref::<Null>().is_some()
    }

    fn describe(&self) -> String {
        "null".to_string()
    }

    fn copy_deep(&self) -> OCValue {
        Null::shared()
    }

    fn is_static(&self) -> bool {
        true
    }

    fn to_json(&self, _typed: bool) -> Result<Json, OCError> {
        Ok(Json::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_is_stable_identity() {
        assert!(Rc::ptr_eq(&Null::shared(), &Null::shared()));
    }

    #[test]
    fn equal_to_itself() {
        assert!(crate::header::equal(&Null::shared(), &Null::shared()));
    }

    #[test]
    fn deep_copy_preserves_identity() {
        let n = Null::shared();
        let copy = crate::header::deep_copy(&n);
        assert!(Rc::ptr_eq(&n, &copy));
    }

    #[test]
    fn not_equal_to_boolean() {
        assert!(!crate::header::equal(&Null::shared(), &crate::boolean::Boolean::falsy()));
    }
}
