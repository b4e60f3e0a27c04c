//! Unordered unique collections (`spec.md` §3.2/§4.4.3, component J).
//!
//! Grounded on `examples/original_source/src/OCSet.c`: a mutable array
//! plus a type-aware equality membership test, `add` a no-op if an equal
//! element is already present, `remove` deletes the first equal element.
//! `spec.md` §4.4.3 specifies this literally as "built atop an internal
//! mutable Array", so this holds an `Rc<Array>` directly and delegates
//! through its inherent methods rather than reimplementing the vector.

use std::any::Any;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::array::Array;
use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// An unordered collection with no duplicate members (by the header's
/// structural equality), built atop a mutable [`Array`].
#[derive(Debug)]
pub struct Set {
    inner: Rc<Array>,
}

/// Registers `OCSet`'s typed-JSON factory on first call. Also called
/// eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCSet", Some(from_typed_json)))
}

impl Set {
    /// Creates an empty mutable set with `capacity` slots reserved.
    pub fn create_mutable(capacity: usize) -> OCValue {
        let obj = Rc::new(Set { inner: Array::new_mutable(capacity) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Set::create_mutable"));
        obj
    }

    /// Number of members.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Adds `value` unless an equal member is already present.
    pub fn add(&self, value: OCValue) {
        if !self.inner.contains(&value) {
            self.inner.append(value);
        }
    }

    /// Removes the first member equal to `value`. Returns whether one
    /// was found.
    pub fn remove(&self, value: &OCValue) -> bool {
        match self.inner.first_index_of(value) {
            Some(i) => {
                let _ = self.inner.remove_at(i);
                true
            }
            None => false,
        }
    }

    /// Whether an equal member is present.
    pub fn contains(&self, value: &OCValue) -> bool {
        self.inner.contains(value)
    }

    /// All members, in unspecified (implementation) order.
    pub fn members(&self) -> Vec<OCValue> {
        (0..self.inner.len()).filter_map(|i| self.inner.get_at(i)).collect()
    }
}

impl ValueObj for Set {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Set>() else {
            return false;
        };
        self.count() == other.count() && self.members().iter().all(|m| other.contains(m))
    }

    fn copy_deep(&self) -> OCValue {
        let copy = Set::create_mutable(self.count());
        let concrete = copy.as_any().downcast_ref::<Set>().unwrap();
        for member in self.members() {
            concrete.add(crate::header::deep_copy(&member));
        }
        copy
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let values = self.members().iter().map(|m| m.to_json(typed)).collect::<Result<Vec<_>, _>>()?;
        if typed {
            Ok(serde_json::json!({ "type": "OCSet", "value": values }))
        } else {
            Ok(Json::Array(values))
        }
    }
}

impl Drop for Set {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCSet")?;
    let value = require_value_field(json, "OCSet")?;
    let items = value
        .as_array()
        .ok_or_else(|| OCError::deserialization("OCSet: \"value\" must be a JSON array"))?;
    let set = Set::create_mutable(items.len());
    let concrete = set.as_any().downcast_ref::<Set>().unwrap();
    for item in items {
        concrete.add(crate::json::typed::from_typed(item)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;
    use crate::number::Number;

    #[test]
    fn add_deduplicates() {
        let set = Set::create_mutable(0);
        let concrete = set.as_any().downcast_ref::<Set>().unwrap();
        concrete.add(Number::create_sint32(1));
        concrete.add(Number::create_sint32(1));
        assert_eq!(concrete.count(), 1);
    }

    #[test]
    fn remove_first_equal_member() {
        let set = Set::create_mutable(0);
        let concrete = set.as_any().downcast_ref::<Set>().unwrap();
        concrete.add(Number::create_sint32(1));
        assert!(concrete.remove(&Number::create_sint32(1)));
        assert_eq!(concrete.count(), 0);
    }

    #[test]
    fn equal_ignores_member_order() {
        let a = Set::create_mutable(0);
        let ac = a.as_any().downcast_ref::<Set>().unwrap();
        ac.add(Number::create_sint32(1));
        ac.add(Number::create_sint32(2));

        let b = Set::create_mutable(0);
        let bc = b.as_any().downcast_ref::<Set>().unwrap();
        bc.add(Number::create_sint32(2));
        bc.add(Number::create_sint32(1));

        assert!(header::equal(&a, &b));
    }
}
