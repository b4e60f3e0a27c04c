//! Tagged scalar numbers (`spec.md` §3.2, component E).
//!
//! Grounded on `examples/original_source/src/OCNumber.h`/`.c`: the same
//! twelve variants, the same try-get-per-variant accessor shape, and the
//! same equality rule (promote to `double` real/imaginary, imaginary
//! defaults to 0 for non-complex). Float formatting deliberately departs
//! from the original's `%.17g`/`%lf`: `%.17g` of `0.6` renders
//! `0.59999999999999997779...`-style trailing-digit garbage, which
//! `spec.md` §8 scenario 2 explicitly forbids, so this uses Rust's
//! shortest-round-trip `Display` for `f32`/`f64` instead.

use std::any::Any;
use std::rc::Rc;
use std::sync::OnceLock;

use serde_json::{Number as JsonNumber, Value as Json};

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::json::typed::{require_type_tag, require_value_field};
use crate::registry::{TypeId, TypeRegistry};

/// The twelve numeric variants `spec.md` §2 names for component E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    SInt8,
    SInt16,
    SInt32,
    SInt64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl NumberType {
    /// The wire `"subtype"` name used in typed JSON (`spec.md` §4.3.2).
    pub fn subtype_name(self) -> &'static str {
        match self {
            NumberType::SInt8 => "int8",
            NumberType::SInt16 => "int16",
            NumberType::SInt32 => "int32",
            NumberType::SInt64 => "int64",
            NumberType::UInt8 => "uint8",
            NumberType::UInt16 => "uint16",
            NumberType::UInt32 => "uint32",
            NumberType::UInt64 => "uint64",
            NumberType::Float32 => "float32",
            NumberType::Float64 => "float64",
            NumberType::Complex64 => "complex64",
            NumberType::Complex128 => "complex128",
        }
    }

    /// Parses a `"subtype"` name, the inverse of [`NumberType::subtype_name`].
    pub fn from_subtype_name(name: &str) -> Result<Self, OCError> {
        Ok(match name {
            "int8" => NumberType::SInt8,
            "int16" => NumberType::SInt16,
            "int32" => NumberType::SInt32,
            "int64" => NumberType::SInt64,
            "uint8" => NumberType::UInt8,
            "uint16" => NumberType::UInt16,
            "uint32" => NumberType::UInt32,
            "uint64" => NumberType::UInt64,
            "float32" => NumberType::Float32,
            "float64" => NumberType::Float64,
            "complex64" => NumberType::Complex64,
            "complex128" => NumberType::Complex128,
            other => return Err(OCError::deserialization(format!("unknown numeric subtype \"{other}\""))),
        })
    }

    /// Size in bytes of one scalar of this type, used by
    /// [`crate::array`]'s number-array ↔ data interop (`spec.md` §4.5).
    pub fn byte_size(self) -> usize {
        match self {
            NumberType::SInt8 | NumberType::UInt8 => 1,
            NumberType::SInt16 | NumberType::UInt16 => 2,
            NumberType::SInt32 | NumberType::UInt32 | NumberType::Float32 => 4,
            NumberType::SInt64 | NumberType::UInt64 | NumberType::Float64 | NumberType::Complex64 => 8,
            NumberType::Complex128 => 16,
        }
    }

    /// Whether this variant has a nonzero imaginary component by
    /// construction.
    pub fn is_complex(self) -> bool {
        matches!(self, NumberType::Complex64 | NumberType::Complex128)
    }
}

#[derive(Debug, Clone, Copy)]
enum Repr {
    SInt8(i8),
    SInt16(i16),
    SInt32(i32),
    SInt64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(f32, f32),
    Complex128(f64, f64),
}

/// A tagged scalar numeric value object.
#[derive(Debug)]
pub struct Number {
    repr: Repr,
}

/// Registers `OCNumber`'s typed-JSON factory on first call. Also called
/// eagerly by [`crate::initialize`] (`spec.md` §4.1/§6).
pub(crate) fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register_with_factory("OCNumber", Some(from_typed_json)))
}

macro_rules! convenience_ctor {
    ($name:ident, $repr_variant:ident, $t:ty) => {
        #[doc = concat!("Creates a `", stringify!($t), "`-valued `Number`.")]
        pub fn $name(value: $t) -> OCValue {
            let obj = Rc::new(Number { repr: Repr::$repr_variant(value) });
            crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some(stringify!($name)));
            obj
        }
    };
}

impl Number {
    convenience_ctor!(create_sint8, SInt8, i8);
    convenience_ctor!(create_sint16, SInt16, i16);
    convenience_ctor!(create_sint32, SInt32, i32);
    convenience_ctor!(create_sint64, SInt64, i64);
    convenience_ctor!(create_uint8, UInt8, u8);
    convenience_ctor!(create_uint16, UInt16, u16);
    convenience_ctor!(create_uint32, UInt32, u32);
    convenience_ctor!(create_uint64, UInt64, u64);
    convenience_ctor!(create_float32, Float32, f32);
    convenience_ctor!(create_float64, Float64, f64);

    /// Creates a `complex64` (32-bit-component complex) value.
    pub fn create_complex64(real: f32, imag: f32) -> OCValue {
        let obj = Rc::new(Number { repr: Repr::Complex64(real, imag) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("create_complex64"));
        obj
    }

    /// Creates a `complex128` (64-bit-component complex) value.
    pub fn create_complex128(real: f64, imag: f64) -> OCValue {
        let obj = Rc::new(Number { repr: Repr::Complex128(real, imag) });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("create_complex128"));
        obj
    }

    /// The stored variant tag.
    pub fn number_type(&self) -> NumberType {
        match self.repr {
            Repr::SInt8(_) => NumberType::SInt8,
            Repr::SInt16(_) => NumberType::SInt16,
            Repr::SInt32(_) => NumberType::SInt32,
            Repr::SInt64(_) => NumberType::SInt64,
            Repr::UInt8(_) => NumberType::UInt8,
            Repr::UInt16(_) => NumberType::UInt16,
            Repr::UInt32(_) => NumberType::UInt32,
            Repr::UInt64(_) => NumberType::UInt64,
            Repr::Float32(_) => NumberType::Float32,
            Repr::Float64(_) => NumberType::Float64,
            Repr::Complex64(..) => NumberType::Complex64,
            Repr::Complex128(..) => NumberType::Complex128,
        }
    }

    /// Promotes the value to a `(real, imaginary)` pair of `f64`s
    /// (`spec.md` §3.3's equality-comparison promotion rule).
    pub fn as_f64_pair(&self) -> (f64, f64) {
        match self.repr {
            Repr::SInt8(v) => (v as f64, 0.0),
            Repr::SInt16(v) => (v as f64, 0.0),
            Repr::SInt32(v) => (v as f64, 0.0),
            Repr::SInt64(v) => (v as f64, 0.0),
            Repr::UInt8(v) => (v as f64, 0.0),
            Repr::UInt16(v) => (v as f64, 0.0),
            Repr::UInt32(v) => (v as f64, 0.0),
            Repr::UInt64(v) => (v as f64, 0.0),
            Repr::Float32(v) => (v as f64, 0.0),
            Repr::Float64(v) => (v, 0.0),
            Repr::Complex64(r, i) => (r as f64, i as f64),
            Repr::Complex128(r, i) => (r, i),
        }
    }

    /// The value as an exact `i128`, if this variant is one of the eight
    /// integer kinds. `i128` holds every `i64`/`u64` value exactly, so
    /// this is used as the "compare natively before promoting" fast path
    /// from `SPEC_FULL.md` §2.3.
    fn exact_integer(&self) -> Option<i128> {
        match self.repr {
            Repr::SInt8(v) => Some(v as i128),
            Repr::SInt16(v) => Some(v as i128),
            Repr::SInt32(v) => Some(v as i128),
            Repr::SInt64(v) => Some(v as i128),
            Repr::UInt8(v) => Some(v as i128),
            Repr::UInt16(v) => Some(v as i128),
            Repr::UInt32(v) => Some(v as i128),
            Repr::UInt64(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Try-get accessor: succeeds only if the stored variant is exactly
    /// `int8` (`spec.md` §4 try-get contract — no implicit widening).
    pub fn try_get_sint8(&self) -> Option<i8> {
        match self.repr { Repr::SInt8(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `int16`.
    pub fn try_get_sint16(&self) -> Option<i16> {
        match self.repr { Repr::SInt16(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `int32`.
    pub fn try_get_sint32(&self) -> Option<i32> {
        match self.repr { Repr::SInt32(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `int64`.
    pub fn try_get_sint64(&self) -> Option<i64> {
        match self.repr { Repr::SInt64(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `uint8`.
    pub fn try_get_uint8(&self) -> Option<u8> {
        match self.repr { Repr::UInt8(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `uint16`.
    pub fn try_get_uint16(&self) -> Option<u16> {
        match self.repr { Repr::UInt16(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `uint32`.
    pub fn try_get_uint32(&self) -> Option<u32> {
        match self.repr { Repr::UInt32(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `uint64`.
    pub fn try_get_uint64(&self) -> Option<u64> {
        match self.repr { Repr::UInt64(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `float32`.
    pub fn try_get_float32(&self) -> Option<f32> {
        match self.repr { Repr::Float32(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `float64`.
    pub fn try_get_float64(&self) -> Option<f64> {
        match self.repr { Repr::Float64(v) => Some(v), _ => None }
    }
    /// Try-get accessor for exactly `complex64`.
    pub fn try_get_complex64(&self) -> Option<(f32, f32)> {
        match self.repr { Repr::Complex64(r, i) => Some((r, i)), _ => None }
    }
    /// Try-get accessor for exactly `complex128`.
    pub fn try_get_complex128(&self) -> Option<(f64, f64)> {
        match self.repr { Repr::Complex128(r, i) => Some((r, i)), _ => None }
    }
}

impl ValueObj for Number {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Number>() else {
            return false;
        };
        match (self.exact_integer(), other.exact_integer()) {
            (Some(a), Some(b)) => a == b,
            _ => {
                let (ar, ai) = self.as_f64_pair();
                let (br, bi) = other.as_f64_pair();
                ar == br && ai == bi
            }
        }
    }

    fn describe(&self) -> String {
        match self.repr {
            Repr::SInt8(v) => format!("{v}"),
            Repr::SInt16(v) => format!("{v}"),
            Repr::SInt32(v) => format!("{v}"),
            Repr::SInt64(v) => format!("{v}"),
            Repr::UInt8(v) => format!("{v}"),
            Repr::UInt16(v) => format!("{v}"),
            Repr::UInt32(v) => format!("{v}"),
            Repr::UInt64(v) => format!("{v}"),
            Repr::Float32(v) => format!("{v}"),
            Repr::Float64(v) => format!("{v}"),
            Repr::Complex64(r, i) => describe_complex(r as f64, i as f64),
            Repr::Complex128(r, i) => describe_complex(r, i),
        }
    }

    fn copy_deep(&self) -> OCValue {
        let obj = Rc::new(Number { repr: self.repr });
        crate::leak::track(Rc::as_ptr(&obj) as *const () as usize, type_id(), Some("Number::copy_deep"));
        obj
    }

    fn to_json(&self, typed: bool) -> Result<Json, OCError> {
        if !typed {
            return match self.repr {
                Repr::Complex64(r, i) => Ok(Json::Array(vec![json_f64(r as f64), json_f64(i as f64)])),
                Repr::Complex128(r, i) => Ok(Json::Array(vec![json_f64(r), json_f64(i)])),
                _ => {
                    let (real, _) = self.as_f64_pair();
                    Ok(json_f64(real))
                }
            };
        }
        let value = match self.repr {
            Repr::Complex64(r, i) => Json::Array(vec![json_f64(r as f64), json_f64(i as f64)]),
            Repr::Complex128(r, i) => Json::Array(vec![json_f64(r), json_f64(i)]),
            _ => {
                let (real, _) = self.as_f64_pair();
                json_f64(real)
            }
        };
        Ok(serde_json::json!({
            "type": "OCNumber",
            "subtype": self.number_type().subtype_name(),
            "value": value,
        }))
    }
}

impl Drop for Number {
    fn drop(&mut self) {
        crate::leak::untrack(self as *const Self as *const () as usize);
    }
}

fn json_f64(v: f64) -> Json {
    JsonNumber::from_f64(v).map(Json::Number).unwrap_or(Json::Null)
}

fn describe_complex(real: f64, imag: f64) -> String {
    if imag.is_sign_negative() {
        format!("{real}{imag}i")
    } else {
        format!("{real}+{imag}i")
    }
}

fn from_typed_json(json: &Json) -> Result<OCValue, OCError> {
    require_type_tag(json, "OCNumber")?;
    let subtype = json
        .as_object()
        .and_then(|m| m.get("subtype"))
        .and_then(Json::as_str)
        .ok_or_else(|| OCError::deserialization("OCNumber: missing \"subtype\" field"))?;
    let ty = NumberType::from_subtype_name(subtype)?;
    let value = require_value_field(json, "OCNumber")?;
    from_value(ty, value)
}

fn from_value(ty: NumberType, value: &Json) -> Result<OCValue, OCError> {
    if ty.is_complex() {
        let pair = value
            .as_array()
            .filter(|a| a.len() == 2)
            .ok_or_else(|| OCError::deserialization("OCNumber: complex value must be a [real, imag] pair"))?;
        let real = pair[0]
            .as_f64()
            .ok_or_else(|| OCError::deserialization("OCNumber: non-numeric real component"))?;
        let imag = pair[1]
            .as_f64()
            .ok_or_else(|| OCError::deserialization("OCNumber: non-numeric imaginary component"))?;
        return Ok(match ty {
            NumberType::Complex64 => Number::create_complex64(real as f32, imag as f32),
            NumberType::Complex128 => Number::create_complex128(real, imag),
            _ => unreachable!(),
        });
    }
    let n = value
        .as_f64()
        .ok_or_else(|| OCError::deserialization("OCNumber: non-numeric value"))?;
    Ok(match ty {
        NumberType::SInt8 => Number::create_sint8(n as i8),
        NumberType::SInt16 => Number::create_sint16(n as i16),
        NumberType::SInt32 => Number::create_sint32(n as i32),
        NumberType::SInt64 => Number::create_sint64(n as i64),
        NumberType::UInt8 => Number::create_uint8(n as u8),
        NumberType::UInt16 => Number::create_uint16(n as u16),
        NumberType::UInt32 => Number::create_uint32(n as u32),
        NumberType::UInt64 => Number::create_uint64(n as u64),
        NumberType::Float32 => Number::create_float32(n as f32),
        NumberType::Float64 => Number::create_float64(n),
        NumberType::Complex64 | NumberType::Complex128 => unreachable!(),
    })
}

/// Reconstructs a homogeneous-numeric element from a flattened JSON
/// value at `index` within `flat` (`spec.md` §4.5): one slot per scalar,
/// two consecutive slots per complex value.
pub(crate) fn number_from_flat(ty: NumberType, flat: &[Json], index: usize) -> Result<OCValue, OCError> {
    if ty.is_complex() {
        let real = flat
            .get(index * 2)
            .and_then(Json::as_f64)
            .ok_or_else(|| OCError::deserialization("flattened complex array: missing real component"))?;
        let imag = flat
            .get(index * 2 + 1)
            .and_then(Json::as_f64)
            .ok_or_else(|| OCError::deserialization("flattened complex array: missing imaginary component"))?;
        return Ok(match ty {
            NumberType::Complex64 => Number::create_complex64(real as f32, imag as f32),
            NumberType::Complex128 => Number::create_complex128(real, imag),
            _ => unreachable!(),
        });
    }
    let n = flat
        .get(index)
        .and_then(Json::as_f64)
        .ok_or_else(|| OCError::deserialization("flattened numeric array: missing element"))?;
    from_value(ty, &json_f64(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    #[test]
    fn describe_signed_and_unsigned_extremes() {
        assert_eq!(Number::create_sint8(-128).describe(), "-128");
        assert_eq!(Number::create_uint64(18446744073709551615).describe(), "18446744073709551615");
    }

    #[test]
    fn describe_float_has_no_trailing_garbage() {
        let d = Number::create_float64(2.71828);
        assert!(d.describe().starts_with("2.71828"));
        let zero_six = Number::create_float64(0.6);
        assert_eq!(zero_six.describe(), "0.6");
    }

    #[test]
    fn describe_complex_has_no_space_around_sign() {
        assert_eq!(Number::create_complex128(1.0, 2.0).describe(), "1+2i");
        assert_eq!(Number::create_complex128(1.0, -2.0).describe(), "1-2i");
    }

    #[test]
    fn equality_promotes_across_variants() {
        let a = Number::create_sint32(5);
        let b = Number::create_float64(5.0);
        assert!(header::equal(&a, &b));
    }

    #[test]
    fn equality_same_class_is_exact() {
        let a = Number::create_uint64(u64::MAX);
        let b = Number::create_uint64(u64::MAX);
        assert!(header::equal(&a, &b));
    }

    #[test]
    fn complex_equality_requires_matching_imaginary() {
        let a = Number::create_complex128(1.0, 2.0);
        let b = Number::create_complex128(1.0, 3.0);
        assert!(!header::equal(&a, &b));
    }

    #[test]
    fn typed_json_round_trips() {
        let n = Number::create_float64(3.25);
        let json = n.to_json(true).unwrap();
        let back = from_typed_json(&json).unwrap();
        assert!(header::equal(&n, &back));
    }

    #[test]
    fn typed_json_round_trips_complex() {
        let n = Number::create_complex128(1.0, 2.0);
        let json = n.to_json(true).unwrap();
        let back = from_typed_json(&json).unwrap();
        assert!(header::equal(&n, &back));
    }

    #[test]
    fn try_get_rejects_mismatched_variant() {
        let n = Number::create_sint32(5);
        let n = n.as_any().downcast_ref::<Number>().unwrap();
        assert_eq!(n.try_get_sint32(), Some(5));
        assert_eq!(n.try_get_sint64(), None);
    }
}
