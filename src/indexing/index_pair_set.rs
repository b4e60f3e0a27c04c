//! Sets of `(index, value)` pairs unique on `index` (`spec.md` §4.4.4).
//!
//! Grounded on `examples/original_source/src/OCIndexPairSet.c`:
//! `OCIndexPairSetAddIndexPair` keeps pairs sorted ascending by index and
//! rejects a pair whose index is already present (no overwrite);
//! `OCIndexPairSetValueForIndex` returns a not-found sentinel when the
//! index is absent, modeled here as `Option::None`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::indexing::index_set::{decode_payload, encode_payload, encoding_name};
use crate::indexing::Encoding;
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// An ascending, index-unique collection of `(index, value)` pairs.
#[derive(Debug)]
pub struct IndexPairSet {
    pairs: RefCell<Vec<(i64, i64)>>,
    encoding: Encoding,
}

/// Registers `OCIndexPairSet`'s typed-JSON factory on first call. Also
/// called eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCIndexPairSet", Some(from_typed_json)))
}

impl IndexPairSet {
    /// Creates an empty mutable pair set using plain-array typed-JSON
    /// encoding.
    pub fn create_mutable() -> OCValue {
        Self::create_mutable_with_encoding(Encoding::None)
    }

    /// Creates an empty mutable pair set with an explicit typed-JSON
    /// encoding.
    pub fn create_mutable_with_encoding(encoding: Encoding) -> OCValue {
        let obj = Rc::new(IndexPairSet { pairs: RefCell::new(Vec::new()), encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexPairSet::create_mutable"));
        obj
    }

    /// Number of pairs.
    pub fn count(&self) -> usize {
        self.pairs.borrow().len()
    }

    /// Adds `(index, value)`. Fails if `index` is already present.
    pub fn add_pair(&self, index: i64, value: i64) -> Result<(), OCError> {
        let mut pairs = self.pairs.borrow_mut();
        match pairs.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(_) => Err(OCError::argument(format!("add_pair: index {index} is already present"))),
            Err(pos) => {
                pairs.insert(pos, (index, value));
                Ok(())
            }
        }
    }

    /// The value stored for `index`, if present.
    pub fn value_for_index(&self, index: i64) -> Option<i64> {
        let pairs = self.pairs.borrow();
        pairs.binary_search_by_key(&index, |&(i, _)| i).ok().map(|pos| pairs[pos].1)
    }

    /// Whether `index` is a member.
    pub fn contains_index(&self, index: i64) -> bool {
        self.value_for_index(index).is_some()
    }

    /// Removes the pair whose index is `index`. Returns whether one was
    /// found.
    pub fn remove_index(&self, index: i64) -> bool {
        let mut pairs = self.pairs.borrow_mut();
        match pairs.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => {
                pairs.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// The smallest index, if any.
    pub fn first_index(&self) -> Option<i64> {
        self.pairs.borrow().first().map(|&(i, _)| i)
    }

    /// The largest index, if any.
    pub fn last_index(&self) -> Option<i64> {
        self.pairs.borrow().last().map(|&(i, _)| i)
    }

    /// All pairs in ascending-index order.
    pub fn pairs(&self) -> Vec<(i64, i64)> {
        self.pairs.borrow().clone()
    }
}

impl ValueObj for IndexPairSet {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        match other.as_any().downcast_ref::<IndexPairSet>() {
            Some(o) => *self.pairs.borrow() == *o.pairs.borrow(),
            None => false,
        }
    }

    fn copy_deep(&self) -> OCValue {
        let obj = Rc::new(IndexPairSet { pairs: RefCell::new(self.pairs.borrow().clone()), encoding: self.encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexPairSet::copy_deep"));
        obj
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let flat: Vec<i64> = self.pairs.borrow().iter().flat_map(|&(i, v)| [i, v]).collect();
        if !typed {
            return Ok(Json::Array(flat.iter().map(|&v| serde_json::json!(v)).collect()));
        }
        Ok(serde_json::json!({
            "type": "OCIndexPairSet",
            "encoding": encoding_name(self.encoding),
            "value": encode_payload(&flat, self.encoding),
        }))
    }
}

impl Drop for IndexPairSet {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCIndexPairSet")?;
    let encoding = match json.as_object().and_then(|m| m.get("encoding")).and_then(Json::as_str) {
        Some("none") | None => Encoding::None,
        Some("base64") => Encoding::Base64,
        Some(other) => return Err(OCError::deserialization(format!("OCIndexPairSet: unknown encoding \"{other}\""))),
    };
    let value = require_value_field(json, "OCIndexPairSet")?;
    let flat = decode_payload(value, encoding, "OCIndexPairSet")?;
    if flat.len() % 2 != 0 {
        return Err(OCError::deserialization("OCIndexPairSet: flattened payload has odd length"));
    }
    let set = IndexPairSet::create_mutable_with_encoding(encoding);
    let concrete = set.as_any().downcast_ref::<IndexPairSet>().unwrap();
    for chunk in flat.chunks_exact(2) {
        concrete.add_pair(chunk[0], chunk[1])?;
    }
    Ok(set)
}
