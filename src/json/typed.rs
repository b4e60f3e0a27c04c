//! Typed JSON reconstruction (`spec.md` §4.3.2).
//!
//! Primitives are recognized directly by JSON shape; everything else
//! routes through the type registry by its `"type"` tag, exactly as
//! `spec.md` §9 asks ("a small map from registered name to a constructor
//! closure; avoid per-call `strcmp` chains") — here the map is the
//! registry's own `(name, factory)` table (`src/registry.rs`), and the
//! closure is a plain `fn` pointer since every factory here is free of
//! captured state.

use serde_json::Value as Json;

use crate::boolean::Boolean;
use crate::error::OCError;
use crate::header::OCValue;
use crate::null::Null;
use crate::registry::TypeRegistry;
use crate::string::OCString;

/// The constructor every container/number type registers for typed-JSON
/// reconstruction: given the full JSON node (including its `"type"` tag
/// for object-shaped nodes), build the value or fail.
pub type TypedFactory = fn(&Json) -> Result<OCValue, OCError>;

/// Reconstructs a value from typed JSON (`spec.md` §4.3.2, §6 "Typed
/// JSON reconstruction entry point").
///
/// - `null`/`bool`/`string` are unambiguous and reconstruct directly as
///   the Null singleton, a Boolean singleton, or an `OCString`.
/// - A bare JSON number reconstructs as a `float64` `Number` — a typed
///   numeric scalar standing alone (not inside an `OCNumber` object) only
///   arises from hand-authored JSON, so this falls back to the same rule
///   untyped reconstruction uses.
/// - A JSON array with no enclosing `"type"` object reconstructs as an
///   untyped array (`spec.md` §4.3.2: "JSON arrays with no enclosing
///   type object reconstruct as untyped arrays").
/// - A JSON object requires a `"type"` field and dispatches through the
///   registry.
pub fn from_typed(json: &Json) -> Result<OCValue, OCError> {
    crate::initialize();
    match json {
        Json::Null => Ok(Null::shared()),
        Json::Bool(b) => Ok(Boolean::of(*b)),
        Json::Number(n) => Ok(crate::number::Number::create_float64(n.as_f64().ok_or_else(
            || OCError::deserialization("JSON number is not representable as float64"),
        )?)),
        Json::String(s) => Ok(OCString::create(s.as_str())),
        Json::Array(_) => Ok(super::untyped::from_untyped(json)),
        Json::Object(map) => {
            let type_name = map
                .get("type")
                .and_then(Json::as_str)
                .ok_or_else(|| OCError::deserialization("object is missing a \"type\" field"))?;
            let factory = TypeRegistry::factory_by_name(type_name)?;
            factory(json)
        }
    }
}

/// Extracts and borrows the `"type"` tag of a typed-JSON object node, or
/// fails with a deserialization error naming `context`.
pub fn require_type_tag<'a>(json: &'a Json, context: &str) -> Result<&'a str, OCError> {
    json.as_object()
        .and_then(|map| map.get("type"))
        .and_then(Json::as_str)
        .ok_or_else(|| OCError::deserialization(format!("{context}: missing \"type\" field")))
}

/// Extracts the `"value"` field of a typed-JSON object node, or fails
/// with a deserialization error naming `context`.
pub fn require_value_field<'a>(json: &'a Json, context: &str) -> Result<&'a Json, OCError> {
    json.as_object()
        .and_then(|map| map.get("value"))
        .ok_or_else(|| OCError::deserialization(format!("{context}: missing \"value\" field")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip_by_shape() {
        assert!(crate::header::equal(&from_typed(&Json::Null).unwrap(), &Null::shared()));
        assert!(crate::header::equal(
            &from_typed(&Json::Bool(true)).unwrap(),
            &Boolean::truthy()
        ));
        let s = from_typed(&Json::String("hi".into())).unwrap();
        assert!(crate::header::equal(&s, &OCString::create("hi")));
    }

    #[test]
    fn object_without_type_tag_fails() {
        let json = serde_json::json!({"foo": 1});
        assert!(from_typed(&json).is_err());
    }

    #[test]
    fn object_with_unregistered_type_fails() {
        let json = serde_json::json!({"type": "NotARealType"});
        assert!(from_typed(&json).is_err());
    }
}
