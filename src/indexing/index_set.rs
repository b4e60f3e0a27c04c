//! Sorted, unique integer sets (`spec.md` §4.4.4).
//!
//! Grounded on `examples/original_source/src/OCIndexSet.c`:
//! `OCIndexSetAddIndex` keeps the backing buffer sorted and duplicate-free,
//! `OCIndexSetFirstIndex`/`LastIndex`/`IndexLessThanIndex`/
//! `IndexGreaterThanIndex` are range queries over that sorted buffer.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use base64::{decode_config, encode_config, STANDARD};
use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::indexing::Encoding;
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// A strictly ascending, duplicate-free sequence of indices.
#[derive(Debug)]
pub struct IndexSet {
    values: RefCell<Vec<i64>>,
    encoding: Encoding,
}

/// Registers `OCIndexSet`'s typed-JSON factory on first call. Also
/// called eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCIndexSet", Some(from_typed_json)))
}

impl IndexSet {
    /// Creates an empty mutable set using plain-array typed-JSON encoding.
    pub fn create_mutable() -> OCValue {
        Self::create_mutable_with_encoding(Encoding::None)
    }

    /// Creates an empty mutable set with an explicit typed-JSON encoding.
    pub fn create_mutable_with_encoding(encoding: Encoding) -> OCValue {
        let obj = Rc::new(IndexSet { values: RefCell::new(Vec::new()), encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexSet::create_mutable"));
        obj
    }

    /// Number of indices.
    pub fn count(&self) -> usize {
        self.values.borrow().len()
    }

    /// The smallest index, if any.
    pub fn first(&self) -> Option<i64> {
        self.values.borrow().first().copied()
    }

    /// The largest index, if any.
    pub fn last(&self) -> Option<i64> {
        self.values.borrow().last().copied()
    }

    /// Whether `index` is a member.
    pub fn contains(&self, index: i64) -> bool {
        self.values.borrow().binary_search(&index).is_ok()
    }

    /// Adds `index`, preserving sort order and uniqueness. No-op if
    /// already present.
    pub fn add(&self, index: i64) {
        let mut values = self.values.borrow_mut();
        if let Err(pos) = values.binary_search(&index) {
            values.insert(pos, index);
        }
    }

    /// The largest member strictly less than `index`, if any.
    pub fn index_less_than(&self, index: i64) -> Option<i64> {
        self.values.borrow().iter().rev().find(|&&v| v < index).copied()
    }

    /// The smallest member strictly greater than `index`, if any.
    pub fn index_greater_than(&self, index: i64) -> Option<i64> {
        self.values.borrow().iter().find(|&&v| v > index).copied()
    }
}

impl ValueObj for IndexSet {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        match other.as_any().downcast_ref::<IndexSet>() {
            Some(o) => *self.values.borrow() == *o.values.borrow(),
            None => false,
        }
    }

    fn copy_deep(&self) -> OCValue {
        let obj = Rc::new(IndexSet { values: RefCell::new(self.values.borrow().clone()), encoding: self.encoding });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("IndexSet::copy_deep"));
        obj
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let values = self.values.borrow();
        if !typed {
            return Ok(Json::Array(values.iter().map(|&v| serde_json::json!(v)).collect()));
        }
        Ok(serde_json::json!({
            "type": "OCIndexSet",
            "encoding": encoding_name(self.encoding),
            "value": encode_payload(&values, self.encoding),
        }))
    }
}

impl Drop for IndexSet {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

pub(crate) fn encoding_name(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::None => "none",
        Encoding::Base64 => "base64",
    }
}

pub(crate) fn encode_payload(values: &[i64], encoding: Encoding) -> Json {
    match encoding {
        Encoding::None => Json::Array(values.iter().map(|&v| serde_json::json!(v)).collect()),
        Encoding::Base64 => {
            let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            Json::String(encode_config(bytes, STANDARD))
        }
    }
}

pub(crate) fn decode_payload(json: &Json, encoding: Encoding, context: &str) -> Result<Vec<i64>, OCError> {
    match encoding {
        Encoding::None => json
            .as_array()
            .ok_or_else(|| OCError::deserialization(format!("{context}: \"value\" must be a JSON array")))?
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| OCError::deserialization(format!("{context}: non-integer element"))))
            .collect(),
        Encoding::Base64 => {
            let encoded = json
                .as_str()
                .ok_or_else(|| OCError::deserialization(format!("{context}: \"value\" must be a base64 string")))?;
            let bytes = decode_config(encoded, STANDARD)
                .map_err(|e| OCError::deserialization(format!("{context}: invalid base64: {e}")))?;
            if bytes.len() % 8 != 0 {
                return Err(OCError::deserialization(format!("{context}: base64 payload is not a multiple of 8 bytes")));
            }
            Ok(bytes.chunks_exact(8).map(|c| i64::from_le_bytes(c.try_into().unwrap())).collect())
        }
    }
}

fn parse_encoding(json: &Json, context: &str) -> Result<Encoding, OCError> {
    match json.as_object().and_then(|m| m.get("encoding")).and_then(Json::as_str) {
        Some("none") | None => Ok(Encoding::None),
        Some("base64") => Ok(Encoding::Base64),
        Some(other) => Err(OCError::deserialization(format!("{context}: unknown encoding \"{other}\""))),
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCIndexSet")?;
    let encoding = parse_encoding(json, "OCIndexSet")?;
    let value = require_value_field(json, "OCIndexSet")?;
    let values = decode_payload(value, encoding, "OCIndexSet")?;
    let set = IndexSet::create_mutable_with_encoding(encoding);
    let concrete = set.as_any().downcast_ref::<IndexSet>().unwrap();
    for v in values {
        concrete.add(v);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    #[test]
    fn range_queries_match_scenario() {
        let set = IndexSet::create_mutable();
        let concrete = set.as_any().downcast_ref::<IndexSet>().unwrap();
        for i in [5, 10, 11, 12, 20] {
            concrete.add(i);
        }
        assert_eq!(concrete.count(), 5);
        assert_eq!(concrete.first(), Some(5));
        assert_eq!(concrete.last(), Some(20));
        assert_eq!(concrete.index_less_than(25), Some(20));
        assert_eq!(concrete.index_greater_than(12), Some(20));
    }

    #[test]
    fn add_is_idempotent_and_stays_sorted() {
        let set = IndexSet::create_mutable();
        let concrete = set.as_any().downcast_ref::<IndexSet>().unwrap();
        concrete.add(5);
        concrete.add(1);
        concrete.add(5);
        assert_eq!(concrete.count(), 2);
        assert_eq!(concrete.first(), Some(1));
    }

    #[test]
    fn both_encodings_round_trip() {
        for encoding in [Encoding::None, Encoding::Base64] {
            let set = IndexSet::create_mutable_with_encoding(encoding);
            let concrete = set.as_any().downcast_ref::<IndexSet>().unwrap();
            for i in [1, 2, 3] {
                concrete.add(i);
            }
            let json = set.to_json(true).unwrap();
            let back = from_typed_json(&json).unwrap();
            assert!(header::equal(&set, &back));
        }
    }
}
