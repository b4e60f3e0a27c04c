//! Arbitrary (order- and duplicate-preserving) integer sequences
//! (`spec.md` §4.4.4).
//!
//! Grounded on `examples/original_source/src/OCIndexArray.c`:
//! `OCIndexArrayAppendValue`/`SetValueAtIndex`/`RemoveValueAtIndex` operate
//! on a plain growable buffer with no sort/uniqueness constraint, and
//! `OCIndexArrayRemoveValuesAtIndexes` removes from highest index to
//! lowest so earlier removals don't shift the indices still to be removed.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::indexing::index_set::{decode_payload, encode_payload, encoding_name};
use crate::indexing::{Encoding, IndexSet};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// A sequence of `i64` values; order and duplicates are preserved.
#[derive(Debug)]
pub struct IndexArray {
    values: RefCell<Vec<i64>>,
    encoding: Encoding,
}

/// Registers `OCIndexArray`'s typed-JSON factory on first call. Also
/// called eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCIndexArray", Some(from_typed_json)))
}

impl IndexArray {
    /// Creates an empty mutable sequence using plain-array typed-JSON
    /// encoding.
    pub fn create_mutable() -> OCValue {
        Self::create_mutable_with_encoding(Encoding::None)
    }

    /// Creates an empty mutable sequence with an explicit typed-JSON
    /// encoding.
    pub fn create_mutable_with_encoding(encoding: Encoding) -> OCValue {
        let obj = Rc::new(IndexArray { values: RefCell::new(Vec::new()), encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexArray::create_mutable"));
        obj
    }

    /// Number of values.
    pub fn count(&self) -> usize {
        self.values.borrow().len()
    }

    /// The value at `index`, if in bounds.
    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.values.borrow().get(index).copied()
    }

    /// Overwrites the value at `index`. No-op if out of bounds.
    pub fn set_value_at(&self, index: usize, value: i64) {
        if let Some(slot) = self.values.borrow_mut().get_mut(index) {
            *slot = value;
        }
    }

    /// Appends `value` to the end.
    pub fn append(&self, value: i64) {
        self.values.borrow_mut().push(value);
    }

    /// Removes and returns the value at `index`, shifting later values
    /// down.
    pub fn remove_at(&self, index: usize) -> Option<i64> {
        let mut values = self.values.borrow_mut();
        if index < values.len() {
            Some(values.remove(index))
        } else {
            None
        }
    }

    /// Removes every position named by `targets`, highest index first so
    /// earlier removals never shift a not-yet-removed target.
    pub fn remove_at_indexes(&self, targets: &IndexSet) {
        let mut positions: Vec<i64> = (0..self.count() as i64).filter(|i| targets.contains(*i)).collect();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        let mut values = self.values.borrow_mut();
        for pos in positions {
            values.remove(pos as usize);
        }
    }

    /// Whether `value` occurs anywhere in the sequence.
    pub fn contains(&self, value: i64) -> bool {
        self.values.borrow().contains(&value)
    }
}

impl ValueObj for IndexArray {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        match other.as_any().downcast_ref::<IndexArray>() {
            Some(o) => *self.values.borrow() == *o.values.borrow(),
            None => false,
        }
    }

    fn copy_deep(&self) -> OCValue {
        let obj = Rc::new(IndexArray { values: RefCell::new(self.values.borrow().clone()), encoding: self.encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexArray::copy_deep"));
        obj
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let values = self.values.borrow();
        if !typed {
            return Ok(Json::Array(values.iter().map(|&v| serde_json::json!(v)).collect()));
        }
        Ok(serde_json::json!({
            "type": "OCIndexArray",
            "encoding": encoding_name(self.encoding),
            "value": encode_payload(&values, self.encoding),
        }))
    }
}

impl Drop for IndexArray {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCIndexArray")?;
    let encoding = match json.as_object().and_then(|m| m.get("encoding")).and_then(Json::as_str) {
        Some("none") | None => Encoding::None,
        Some("base64") => Encoding::Base64,
        Some(other) => return Err(OCError::deserialization(format!("OCIndexArray: unknown encoding \"{other}\""))),
    };
    let value = require_value_field(json, "OCIndexArray")?;
    let values = decode_payload(value, encoding, "OCIndexArray")?;
    let array = IndexArray::create_mutable_with_encoding(encoding);
    let concrete = array.as_any().downcast_ref::<IndexArray>().unwrap();
    for v in values {
        concrete.append(v);
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    #[test]
    fn preserves_order_and_duplicates() {
        let array = IndexArray::create_mutable();
        let concrete = array.as_any().downcast_ref::<IndexArray>().unwrap();
        for v in [3, 1, 3, 2] {
            concrete.append(v);
        }
        assert_eq!(concrete.count(), 4);
        assert_eq!(concrete.value_at(2), Some(3));
    }

    #[test]
    fn remove_at_indexes_handles_unordered_targets() {
        let array = IndexArray::create_mutable();
        let concrete = array.as_any().downcast_ref::<IndexArray>().unwrap();
        for v in [10, 20, 30, 40, 50] {
            concrete.append(v);
        }
        let targets = IndexSet::create_mutable();
        let targets_concrete = targets.as_any().downcast_ref::<IndexSet>().unwrap();
        targets_concrete.add(1);
        targets_concrete.add(3);
        concrete.remove_at_indexes(targets_concrete);
        assert_eq!(concrete.count(), 3);
        assert_eq!(concrete.value_at(0), Some(10));
        assert_eq!(concrete.value_at(1), Some(30));
        assert_eq!(concrete.value_at(2), Some(50));
    }

    #[test]
    fn typed_json_round_trip() {
        let array = IndexArray::create_mutable_with_encoding(Encoding::Base64);
        let concrete = array.as_any().downcast_ref::<IndexArray>().unwrap();
        for v in [7, 7, -3] {
            concrete.append(v);
        }
        let json = array.to_json(true).unwrap();
        let back = from_typed_json(&json).unwrap();
        assert!(header::equal(&array, &back));
    }
}
