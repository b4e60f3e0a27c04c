//! Ordered key→value maps (`spec.md` §3.2/§4.4.2, component I).
//!
//! Grounded on the teacher's `src/maps.rs` (parallel key/value vector
//! shape) generalized to `Rc<dyn ValueObj>` values with `OCString` keys,
//! and on `examples/original_source/src/OCDictionary.c` for the
//! add/set/replace/remove contract: `OCDictionaryAddValue` always
//! upserts, `OCDictionarySetValue` is `AddValue`'s public alias,
//! `OCDictionaryReplaceValue` fails on a missing key — `spec.md` §4.4.2
//! already normalizes this (see `SPEC_FULL.md` §2.2), so `set`/`add` here
//! are one method and `replace` is the one that can fail.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};
use crate::string::OCString;

/// An ordered key→value map. Keys are always `OCString`s, deep-copied on
/// insert; values are retained.
#[derive(Debug)]
pub struct Dictionary {
    entries: RefCell<Vec<(OCValue, OCValue)>>,
}

/// Registers `OCDictionary`'s typed-JSON factory on first call. Also
/// called eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCDictionary", Some(from_typed_json)))
}

fn key_text(key: &OCValue) -> Option<String> {
    key.as_any().downcast_ref::<OCString>().map(OCString::as_string)
}

impl Dictionary {
    /// Creates an empty mutable dictionary with `capacity` slots reserved.
    pub fn create_mutable(capacity: usize) -> OCValue {
        let obj = Rc::new(Dictionary { entries: RefCell::new(Vec::with_capacity(capacity)) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Dictionary::create_mutable"));
        obj
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index_of_key(key).is_some()
    }

    /// The index of `key` in insertion order, if present.
    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.entries.borrow().iter().position(|(k, _)| key_text(k).as_deref() == Some(key))
    }

    /// Returns a retained clone of the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<OCValue> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| key_text(k).as_deref() == Some(key))
            .map(|(_, v)| Rc::clone(v))
    }

    /// Upserts `key` → `value` (`spec.md` §4.4.2's normalized
    /// `set`/`add`): replaces the value if `key` exists, else appends a
    /// new `(deep_copy(key), value)` pair.
    pub fn set(&self, key: &str, value: OCValue) {
        let mut entries = self.entries.borrow_mut();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| key_text(k).as_deref() == Some(key)) {
            slot.1 = value;
        } else {
            entries.push((OCString::create(key), value));
        }
    }

    /// Alias for [`Dictionary::set`], matching the original's
    /// `OCDictionaryAddValue` name.
    pub fn add(&self, key: &str, value: OCValue) {
        self.set(key, value);
    }

    /// Replaces the value for `key`. Fails if `key` is absent.
    pub fn replace(&self, key: &str, value: OCValue) -> Result<(), OCError> {
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| key_text(k).as_deref() == Some(key)) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => Err(OCError::argument(format!("replace: key \"{key}\" is absent"))),
        }
    }

    /// Removes `key`, shifting later entries down. Returns whether a
    /// matching entry was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(k, _)| key_text(k).as_deref() == Some(key)) {
            Some(i) => {
                entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// How many stored values are equal to `value` under the header's
    /// structural equality.
    pub fn count_of_value(&self, value: &OCValue) -> usize {
        self.entries.borrow().iter().filter(|(_, v)| crate::header::equal(v, value)).count()
    }

    /// Borrowed keys and values in internal (insertion) order.
    pub fn keys_and_values(&self) -> (Vec<OCValue>, Vec<OCValue>) {
        let entries = self.entries.borrow();
        (
            entries.iter().map(|(k, _)| Rc::clone(k)).collect(),
            entries.iter().map(|(_, v)| Rc::clone(v)).collect(),
        )
    }
}

impl ValueObj for Dictionary {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Dictionary>() else {
            return false;
        };
        let a = self.entries.borrow();
        if a.len() != other.count() {
            return false;
        }
        a.iter().all(|(k, v)| {
            key_text(k)
                .map(|key| other.get(&key).is_some_and(|ov| crate::header::equal(v, &ov)))
                .unwrap_or(false)
        })
    }

    fn copy_deep(&self) -> OCValue {
        let copied: Vec<(OCValue, OCValue)> = self
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (crate::header::deep_copy(k), crate::header::deep_copy(v)))
            .collect();
        let obj = Rc::new(Dictionary { entries: RefCell::new(copied) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Dictionary::copy_deep"));
        obj
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let mut map = serde_json::Map::new();
        for (k, v) in self.entries.borrow().iter() {
            let key = key_text(k).ok_or_else(|| OCError::serialization("dictionary key is not an OCString"))?;
            map.insert(key, v.to_json(typed)?);
        }
        if typed {
            Ok(serde_json::json!({ "type": "OCDictionary", "value": Json::Object(map) }))
        } else {
            Ok(Json::Object(map))
        }
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCDictionary")?;
    let value = require_value_field(json, "OCDictionary")?;
    let map = value
        .as_object()
        .ok_or_else(|| OCError::deserialization("OCDictionary: \"value\" must be a JSON object"))?;
    let dict = Dictionary::create_mutable(map.len());
    let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
    for (key, value) in map {
        concrete.set(key, crate::json::typed::from_typed(value)?);
    }
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::Boolean;
    use crate::header;
    use crate::number::Number;

    #[test]
    fn set_upserts_and_replace_requires_existing_key() {
        let dict = Dictionary::create_mutable(0);
        let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
        concrete.set("a", Number::create_sint32(1));
        assert_eq!(concrete.count(), 1);
        concrete.set("a", Number::create_sint32(2));
        assert_eq!(concrete.count(), 1);
        assert!(header::equal(&concrete.get("a").unwrap(), &Number::create_sint32(2)));
        assert!(concrete.replace("a", Number::create_sint32(3)).is_ok());
        assert!(concrete.replace("missing", Number::create_sint32(4)).is_err());
    }

    #[test]
    fn ordering_does_not_affect_equality() {
        let a = Dictionary::create_mutable(0);
        let ac = a.as_any().downcast_ref::<Dictionary>().unwrap();
        ac.set("x", Boolean::truthy());
        ac.set("y", Boolean::falsy());

        let b = Dictionary::create_mutable(0);
        let bc = b.as_any().downcast_ref::<Dictionary>().unwrap();
        bc.set("y", Boolean::falsy());
        bc.set("x", Boolean::truthy());

        assert!(header::equal(&a, &b));
    }

    #[test]
    fn remove_shifts_down_and_reports_presence() {
        let dict = Dictionary::create_mutable(0);
        let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
        concrete.set("a", Boolean::truthy());
        assert!(concrete.remove("a"));
        assert!(!concrete.remove("a"));
        assert_eq!(concrete.count(), 0);
    }

    #[test]
    fn typed_json_round_trip() {
        let dict = Dictionary::create_mutable(0);
        let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
        concrete.set("n", Number::create_sint32(7));
        let json = dict.to_json(true).unwrap();
        let back = from_typed_json(&json).unwrap();
        assert!(header::equal(&dict, &back));
    }
}
