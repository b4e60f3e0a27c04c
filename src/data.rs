//! Byte buffers (`spec.md` §3.2, component G).
//!
//! Grounded on `examples/original_source/src/OCData.c`: `OCDataCreate`
//! (owned copy), `OCDataCreateMutable`/`OCDataSetLength`/
//! `OCDataIncreaseLength`/`OCDataAppendBytes` for the growable variant.
//! The small-buffer optimization and the base64 JSON encoding are new
//! relative to the original (`SPEC_FULL.md` §0): `smallvec` avoids a
//! heap allocation for buffers up to 32 bytes, the same technique the
//! teacher's `Cargo.toml` already pulls in for small fixed-size runs, and
//! `base64` (sourced from `kata-types` in the retrieval pack) provides
//! the RFC 4648 codec `spec.md` §6 requires as an external collaborator.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use base64::{decode_config, encode_config, STANDARD};
use serde_json::Value as Json;
use smallvec::SmallVec;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// Inline capacity before `OCData` spills its buffer to the heap.
const INLINE_CAPACITY: usize = 32;

type Bytes = SmallVec<[u8; INLINE_CAPACITY]>;

/// A byte buffer value object.
#[derive(Debug)]
pub struct OCData {
    bytes: RefCell<Bytes>,
}

/// Registers `OCData`'s typed-JSON factory on first call. Also called
/// eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCData", Some(from_typed_json)))
}

impl OCData {
    /// Creates an owned copy of `bytes`.
    pub fn create(bytes: &[u8]) -> OCValue {
        let obj = Rc::new(OCData { bytes: RefCell::new(Bytes::from_slice(bytes)) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("OCData::create"));
        obj
    }

    /// Creates an empty mutable buffer with `capacity` bytes reserved.
    pub fn create_mutable(capacity: usize) -> OCValue {
        let obj = Rc::new(OCData { bytes: RefCell::new(Bytes::with_capacity(capacity)) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("OCData::create_mutable"));
        obj
    }

    /// Current length in bytes.
    pub fn length(&self) -> usize {
        self.bytes.borrow().len()
    }

    /// Returns an owned copy of the current bytes.
    pub fn as_vec(&self) -> Vec<u8> {
        self.bytes.borrow().to_vec()
    }

    /// Runs `f` with a borrowed view of the current bytes.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(self.bytes.borrow().as_slice())
    }

    /// Appends `extra` in place (`OCDataAppendBytes`).
    pub fn append_bytes(&self, extra: &[u8]) {
        self.bytes.borrow_mut().extend_from_slice(extra);
    }

    /// Sets the length to exactly `length`, zero-padding on growth or
    /// truncating on shrink (`OCDataSetLength`).
    pub fn set_length(&self, length: usize) {
        let mut bytes = self.bytes.borrow_mut();
        bytes.resize(length, 0);
    }

    /// Grows the length by `extra` zero bytes (`OCDataIncreaseLength`).
    pub fn increase_length(&self, extra: usize) {
        self.set_length(self.length() + extra);
    }
}

impl ValueObj for OCData {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        match other.as_any().downcast_ref::<OCData>() {
            Some(o) => *self.bytes.borrow() == *o.bytes.borrow(),
            None => false,
        }
    }

    fn copy_deep(&self) -> OCValue {
        OCData::create(&self.bytes.borrow())
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        let encoded = encode_config(self.bytes.borrow().as_slice(), STANDARD);
        if typed {
            Ok(serde_json::json!({
                "type": "OCData",
                "encoding": "base64",
                "value": encoded,
            }))
        } else {
            Ok(Json::String(encoded))
        }
    }
}

impl Drop for OCData {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCData")?;
    let value = require_value_field(json, "OCData")?;
    let encoded = value
        .as_str()
        .ok_or_else(|| OCError::deserialization("OCData: \"value\" must be a base64 string"))?;
    let decoded = decode_config(encoded, STANDARD)
        .map_err(|e| OCError::deserialization(format!("OCData: invalid base64: {e}")))?;
    Ok(OCData::create(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    #[test]
    fn equal_by_bytes() {
        let a = OCData::create(&[1, 2, 3]);
        let b = OCData::create(&[1, 2, 3]);
        assert!(header::equal(&a, &b));
        let c = OCData::create(&[1, 2, 4]);
        assert!(!header::equal(&a, &c));
    }

    #[test]
    fn append_and_set_length() {
        let d = OCData::create_mutable(0);
        let concrete = d.as_any().downcast_ref::<OCData>().unwrap();
        concrete.append_bytes(&[1, 2, 3]);
        assert_eq!(concrete.as_vec(), vec![1, 2, 3]);
        concrete.set_length(5);
        assert_eq!(concrete.as_vec(), vec![1, 2, 3, 0, 0]);
        concrete.set_length(2);
        assert_eq!(concrete.as_vec(), vec![1, 2]);
    }

    #[test]
    fn base64_round_trips_every_length_one_to_twenty() {
        for len in 1..=20usize {
            let bytes: Vec<u8> = (0..len as u8).collect();
            let d = OCData::create(&bytes);
            let json = d.to_json(true).unwrap();
            let back = from_typed_json(&json).unwrap();
            assert!(header::equal(&d, &back));
        }
    }
}
