//! Ordered heterogeneous sequences (`spec.md` §3.2/§4.4.1, component H),
//! plus the number-array ↔ data interop of §4.5.
//!
//! Grounded on the teacher's `src/vector.rs` (`Vecs`' growth-by-doubling,
//! `Len`/`Index`/`IndexMut`/`Push` trait vocabulary) generalized from one
//! static element type to `Rc<dyn ValueObj>`, per `spec.md` §4.4.1's
//! callback-governed element contract becoming a trait object instead.
//! The homogeneous-numeric fast path and `array_from_data`/
//! `data_from_array` are grounded on the teacher's `src/primitive.rs`
//! (`bytemuck`-backed byte ↔ scalar-slice reinterpretation).

use std::any::Any;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::number::{number_from_flat, Number, NumberType};
use crate::registry::{TypeId, TypeRegistry};

/// An ordered, heterogeneous sequence of value objects.
#[derive(Debug)]
pub struct Array {
    elements: RefCell<Vec<OCValue>>,
}

/// Registers `OCArray`'s typed-JSON factory on first call, idempotent
/// after that (`spec.md` §4.1). Also called eagerly by
/// [`crate::initialize`] so that `from_typed` can reconstruct an `OCArray`
/// node even in a process that has never constructed one.
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCArray", Some(from_typed_json)))
}

impl Array {
    /// Creates an array from `values`, retaining each (`spec.md` §4.4.1
    /// `create`). Capacity equals length.
    pub fn create(values: Vec<OCValue>) -> OCValue {
        let obj = Rc::new(Array { elements: RefCell::new(values) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Array::create"));
        obj
    }

    /// Creates an empty mutable array with `capacity` slots reserved.
    pub fn create_mutable(capacity: usize) -> OCValue {
        Array::new_mutable(capacity)
    }

    /// Like [`Array::create_mutable`], but keeps the concrete `Rc<Array>`
    /// instead of erasing it to `OCValue` — used internally by
    /// [`crate::set::Set`], which needs to call `Array`'s inherent
    /// methods directly on the container it wraps.
    pub(crate) fn new_mutable(capacity: usize) -> Rc<Array> {
        let obj = Rc::new(Array { elements: RefCell::new(Vec::with_capacity(capacity)) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Array::create_mutable"));
        obj
    }

    /// Current element count.
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Appends `value`, growing capacity by doubling when full
    /// (`spec.md` §4.4.1 `append`; the `RefCell<Vec<_>>`'s own growth
    /// already doubles, matching the original's bootstrap-from-zero
    /// policy without needing to hand-manage capacity).
    pub fn append(&self, value: OCValue) {
        self.elements.borrow_mut().push(value);
    }

    /// Inserts `value` at `index`, shifting the tail up. Fails if
    /// `index > len`.
    pub fn insert_at(&self, index: usize, value: OCValue) -> Result<(), OCError> {
        let mut elements = self.elements.borrow_mut();
        if index > elements.len() {
            return Err(OCError::argument(format!("insert_at: index {index} out of range")));
        }
        elements.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    pub fn remove_at(&self, index: usize) -> Result<OCValue, OCError> {
        let mut elements = self.elements.borrow_mut();
        if index >= elements.len() {
            return Err(OCError::argument(format!("remove_at: index {index} out of range")));
        }
        Ok(elements.remove(index))
    }

    /// Replaces the element at `index`. A no-op (but still `Ok`) if the
    /// new value is pointer-identical to the old one.
    pub fn set_at(&self, index: usize, value: OCValue) -> Result<(), OCError> {
        let mut elements = self.elements.borrow_mut();
        let slot = elements
            .get_mut(index)
            .ok_or_else(|| OCError::argument(format!("set_at: index {index} out of range")))?;
        if !Rc::ptr_eq(slot, &value) {
            *slot = value;
        }
        Ok(())
    }

    /// Returns a retained clone of the element at `index`, or `None` if
    /// out of range.
    pub fn get_at(&self, index: usize) -> Option<OCValue> {
        self.elements.borrow().get(index).map(Rc::clone)
    }

    /// Whether `value` is present, by the header's structural equality.
    pub fn contains(&self, value: &OCValue) -> bool {
        self.first_index_of(value).is_some()
    }

    /// The index of the first element equal to `value`, if any.
    pub fn first_index_of(&self, value: &OCValue) -> Option<usize> {
        self.elements.borrow().iter().position(|v| crate::header::equal(v, value))
    }

    /// Sorts all elements in place with `comparator` (`spec.md` §4.4.1;
    /// stability is not required).
    pub fn sort(&self, comparator: impl FnMut(&OCValue, &OCValue) -> Ordering) {
        self.elements.borrow_mut().sort_by(comparator);
    }

    /// Binary-searches for `value` under `comparator`, which must agree
    /// with the order the array is already sorted by. `Ok(index)` on a
    /// match, `Err(insertion_point)` otherwise.
    pub fn binary_search(
        &self,
        value: &OCValue,
        mut comparator: impl FnMut(&OCValue, &OCValue) -> Ordering,
    ) -> Result<usize, usize> {
        self.elements.borrow().binary_search_by(|probe| comparator(probe, value))
    }

    /// Homogeneity predicate (`spec.md` §4.4.1/§8): non-empty and every
    /// element shares one `type_id`.
    pub fn is_homogeneous(&self) -> bool {
        let elements = self.elements.borrow();
        match elements.split_first() {
            None => false,
            Some((head, tail)) => tail.iter().all(|e| e.type_id() == head.type_id()),
        }
    }

    /// If every element is a `Number` of the same [`NumberType`], returns
    /// that type (the JSON serializer's numeric fast path, `spec.md` §4.5).
    pub fn homogeneous_number_type(&self) -> Option<NumberType> {
        if !self.is_homogeneous() {
            return None;
        }
        let elements = self.elements.borrow();
        let first = elements.first()?.as_any().downcast_ref::<Number>()?;
        Some(first.number_type())
    }

    fn deep_copy_elements(&self) -> Vec<OCValue> {
        self.elements.borrow().iter().map(crate::header::deep_copy).collect()
    }
}

impl ValueObj for Array {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Array>() else {
            return false;
        };
        let a = self.elements.borrow();
        let b = other.elements.borrow();
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| crate::header::equal(x, y))
    }

    fn copy_deep(&self) -> OCValue {
        Array::create(self.deep_copy_elements())
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        if let Some(number_type) = self.homogeneous_number_type() {
            let flat = flatten_numeric(&self.elements.borrow(), number_type)?;
            return if typed {
                Ok(serde_json::json!({
                    "type": "OCArray",
                    "element_type": number_type.subtype_name(),
                    "value": flat,
                }))
            } else {
                Ok(Json::Array(flat))
            };
        }
        let values = self
            .elements
            .borrow()
            .iter()
            .map(|e| e.to_json(typed))
            .collect::<Result<Vec<_>, _>>()?;
        if typed {
            Ok(serde_json::json!({ "type": "OCArray", "value": values }))
        } else {
            Ok(Json::Array(values))
        }
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn flatten_numeric(elements: &[OCValue], ty: NumberType) -> Result<Vec<Json>, OCError> {
    let mut flat = Vec::with_capacity(elements.len() * if ty.is_complex() { 2 } else { 1 });
    for element in elements {
        let number = element
            .as_any()
            .downcast_ref::<Number>()
            .ok_or_else(|| OCError::serialization("homogeneous array element is not a Number"))?;
        let (real, imag) = number.as_f64_pair();
        flat.push(serde_json::Number::from_f64(real).map(Json::Number).unwrap_or(Json::Null));
        if ty.is_complex() {
            flat.push(serde_json::Number::from_f64(imag).map(Json::Number).unwrap_or(Json::Null));
        }
    }
    Ok(flat)
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCArray")?;
    let value = require_value_field(json, "OCArray")?;
    let flat = value
        .as_array()
        .ok_or_else(|| OCError::deserialization("OCArray: \"value\" must be a JSON array"))?;
    if let Some(element_type) = json.as_object().and_then(|m| m.get("element_type")).and_then(Json::as_str) {
        let ty = NumberType::from_subtype_name(element_type)?;
        let count = if ty.is_complex() { flat.len() / 2 } else { flat.len() };
        let elements = (0..count)
            .map(|i| number_from_flat(ty, flat, i))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Array::create(elements));
    }
    let elements = flat.iter().map(crate::json::typed::from_typed).collect::<Result<Vec<_>, _>>()?;
    Ok(Array::create(elements))
}

/// `array_from_data(data, numeric_type)` (`spec.md` §4.5): reinterprets
/// `data`'s bytes as a tightly packed little-endian sequence of scalars
/// (or real/imaginary pairs for the complex variants) of `numeric_type`.
/// Fails unless the byte length is a positive multiple of the scalar size.
pub fn array_from_data(data: &OCValue, numeric_type: NumberType) -> Result<OCValue, OCError> {
    let data = data
        .as_any()
        .downcast_ref::<crate::data::OCData>()
        .ok_or_else(|| OCError::type_mismatch("OCData", "other"))?;
    data.with_bytes(|bytes| {
        let elem_size = numeric_type.byte_size();
        if bytes.is_empty() || bytes.len() % elem_size != 0 {
            return Err(OCError::argument(format!(
                "array_from_data: {} bytes is not a positive multiple of {elem_size}",
                bytes.len()
            )));
        }
        let elements = match numeric_type {
            NumberType::UInt8 => bytes.iter().map(|&v| Number::create_uint8(v)).collect(),
            NumberType::SInt8 => bytemuck::cast_slice::<u8, i8>(bytes).iter().map(|&v| Number::create_sint8(v)).collect(),
            NumberType::UInt16 => bytemuck::try_cast_slice::<u8, u16>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_uint16(v))
                .collect(),
            NumberType::SInt16 => bytemuck::try_cast_slice::<u8, i16>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_sint16(v))
                .collect(),
            NumberType::UInt32 => bytemuck::try_cast_slice::<u8, u32>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_uint32(v))
                .collect(),
            NumberType::SInt32 => bytemuck::try_cast_slice::<u8, i32>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_sint32(v))
                .collect(),
            NumberType::Float32 => bytemuck::try_cast_slice::<u8, f32>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_float32(v))
                .collect(),
            NumberType::UInt64 => bytemuck::try_cast_slice::<u8, u64>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_uint64(v))
                .collect(),
            NumberType::SInt64 => bytemuck::try_cast_slice::<u8, i64>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_sint64(v))
                .collect(),
            NumberType::Float64 => bytemuck::try_cast_slice::<u8, f64>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .iter()
                .map(|&v| Number::create_float64(v))
                .collect(),
            NumberType::Complex64 => bytemuck::try_cast_slice::<u8, f32>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .chunks_exact(2)
                .map(|pair| Number::create_complex64(pair[0], pair[1]))
                .collect(),
            NumberType::Complex128 => bytemuck::try_cast_slice::<u8, f64>(bytes)
                .map_err(|e| OCError::argument(e.to_string()))?
                .chunks_exact(2)
                .map(|pair| Number::create_complex128(pair[0], pair[1]))
                .collect(),
        };
        Ok(Array::create(elements))
    })
}

/// `data_from_array(array, numeric_type)` (`spec.md` §4.5): every
/// element must be a `Number` of exactly `numeric_type`; produces the
/// packed little-endian buffer. Fails on type mismatch. An empty array
/// yields zero-length data.
pub fn data_from_array(array: &OCValue, numeric_type: NumberType) -> Result<OCValue, OCError> {
    let array = array
        .as_any()
        .downcast_ref::<Array>()
        .ok_or_else(|| OCError::type_mismatch("OCArray", "other"))?;
    let elements = array.elements.borrow();
    let mut out = Vec::with_capacity(elements.len() * numeric_type.byte_size());
    for element in elements.iter() {
        let number = element
            .as_any()
            .downcast_ref::<Number>()
            .ok_or_else(|| OCError::type_mismatch("OCNumber", "other"))?;
        if number.number_type() != numeric_type {
            return Err(OCError::type_mismatch(numeric_type.subtype_name(), number.number_type().subtype_name()));
        }
        match numeric_type {
            NumberType::UInt8 => out.push(number.try_get_uint8().unwrap()),
            NumberType::SInt8 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_sint8().unwrap())),
            NumberType::UInt16 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_uint16().unwrap())),
            NumberType::SInt16 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_sint16().unwrap())),
            NumberType::UInt32 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_uint32().unwrap())),
            NumberType::SInt32 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_sint32().unwrap())),
            NumberType::Float32 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_float32().unwrap())),
            NumberType::UInt64 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_uint64().unwrap())),
            NumberType::SInt64 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_sint64().unwrap())),
            NumberType::Float64 => out.extend_from_slice(bytemuck::bytes_of(&number.try_get_float64().unwrap())),
            NumberType::Complex64 => {
                let (r, i) = number.try_get_complex64().unwrap();
                out.extend_from_slice(bytemuck::bytes_of(&r));
                out.extend_from_slice(bytemuck::bytes_of(&i));
            }
            NumberType::Complex128 => {
                let (r, i) = number.try_get_complex128().unwrap();
                out.extend_from_slice(bytemuck::bytes_of(&r));
                out.extend_from_slice(bytemuck::bytes_of(&i));
            }
        }
    }
    Ok(crate::data::OCData::create(&out))
}
