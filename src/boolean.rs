//! The boolean singletons (`spec.md` §3.2/§3.4, component F).
//!
//! Grounded on `examples/original_source/src/OCBoolean.c`: exactly two
//! process-wide instances, created once, `retainCount` pinned at 0 so
//! every `OCRelease` on either is a no-op. Here that becomes two `Rc`s
//! held forever by a process-wide `OnceLock`, matching `spec.md` §9's
//! redesign note ("a different carrier type whose destructor is empty" —
//! the destructor never runs because the registry's own `Rc` never drops).
//!
//! `OCBoolean` is listed among the types that "are serialized as native
//! JSON even in typed mode" (`spec.md` §4.3.2), so it registers a type id
//! for [`crate::header::ValueObj::type_id`]/`describe` but no typed-JSON
//! factory: reconstruction from typed or untyped JSON goes through
//! [`crate::json::untyped`]'s shape dispatch on `Value::Bool`, never
//! through the registry.

use std::any::Any;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::registry::{TypeId, TypeRegistry};

/// A boolean value object. Only ever seen behind the two singletons
/// [`Boolean::truthy`]/[`Boolean::falsy`] — there is no public constructor.
#[derive(Debug)]
pub struct Boolean(bool);

fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register("OCBoolean"))
}

fn singletons() -> &'static (OCValue, OCValue) {
    static SINGLETONS: OnceLock<(OCValue, OCValue)> = OnceLock::new();
    SINGLETONS.get_or_init(|| {
        let t: OCValue = std::rc::Rc::new(Boolean(true));
        let f: OCValue = std::rc::Rc::new(Boolean(false));
        (t, f)
    })
}

impl Boolean {
    /// The singleton `true` value. Always the same allocation.
    pub fn truthy() -> OCValue {
        std::rc::Rc::clone(&singletons().0)
    }

    /// The singleton `false` value. Always the same allocation.
    pub fn falsy() -> OCValue {
        std::rc::Rc::clone(&singletons().1)
    }

    /// The singleton for `value`.
    pub fn of(value: bool) -> OCValue {
        if value {
            Boolean::truthy()
        } else {
            Boolean::falsy()
        }
    }

    /// The native `bool` this singleton represents.
    pub fn value(&self) -> bool {
        self.0
    }
}

impl ValueObj for Boolean {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        other
            .as_any()
            .downcast_ref::<Boolean>()
            .is_some_and(|o| o.0 == self.0)
    }

    fn describe(&self) -> String {
        if self.0 { "true".to_string() } else { "false".to_string() }
    }

    fn copy_deep(&self) -> OCValue {
        Boolean::of(self.0)
    }

    fn is_static(&self) -> bool {
        true
    }

    fn to_json(&self, _typed: bool) -> Result<Json, OCError> {
        Ok(Json::Bool(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn singletons_are_stable_identity() {
        assert!(Rc::ptr_eq(&Boolean::truthy(), &Boolean::truthy()));
        assert!(Rc::ptr_eq(&Boolean::falsy(), &Boolean::falsy()));
    }

    #[test]
    fn truthy_and_falsy_differ() {
        assert!(!Rc::ptr_eq(&Boolean::truthy(), &Boolean::falsy()));
        assert!(!crate::header::equal(&Boolean::truthy(), &Boolean::falsy()));
    }

    #[test]
    fn equal_is_value_based() {
        assert!(crate::header::equal(&Boolean::truthy(), &Boolean::truthy()));
    }

    #[test]
    fn deep_copy_preserves_identity() {
        let t = Boolean::truthy();
        let copy = crate::header::deep_copy(&t);
        assert!(Rc::ptr_eq(&t, &copy));
    }

    #[test]
    fn describe_matches_json_spelling() {
        let t = Boolean::truthy();
        assert_eq!(t.describe(), "true");
    }
}
