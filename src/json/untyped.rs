//! Untyped JSON (de)serialization (`spec.md` §4.3.1).
//!
//! Reconstruction uses JSON shape alone, with no registry lookup — the
//! teacher's `src/adts/json.rs` (`Json`/`JsonIdx`) does the same
//! shape-driven walk over a `serde_json`-shaped tree; this module keeps
//! that recursive-descent structure but builds `octypes` value objects
//! instead of the teacher's columnar `Json` ADT.

use serde_json::Value as Json;

use crate::array::Array;
use crate::boolean::Boolean;
use crate::dictionary::Dictionary;
use crate::header::OCValue;
use crate::null::Null;
use crate::string::OCString;

/// Reconstructs a value from untyped JSON by shape alone (`spec.md`
/// §4.3.1): `null` → the Null singleton, booleans → the Boolean
/// singletons, numbers → a `float64` `Number`, strings → `OCString`,
/// arrays/objects recurse into `Array`/`Dictionary` of untyped values.
pub fn from_untyped(json: &Json) -> OCValue {
    match json {
        Json::Null => Null::shared(),
        Json::Bool(b) => Boolean::of(*b),
        Json::Number(n) => crate::number::Number::create_float64(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => OCString::create(s.as_str()),
        Json::Array(items) => {
            let elements: Vec<OCValue> = items.iter().map(from_untyped).collect();
            Array::create(elements)
        }
        Json::Object(map) => {
            let dict = Dictionary::create_mutable(map.len());
            let concrete = dict
                .as_any()
                .downcast_ref::<Dictionary>()
                .expect("Dictionary::create_mutable always returns a Dictionary");
            for (key, value) in map {
                concrete.set(key, from_untyped(value));
            }
            dict
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header;

    #[test]
    fn mixed_array_with_null_reconstructs() {
        let json = serde_json::json!([1, null, "hello", true]);
        let arr = from_untyped(&json);
        let concrete = arr.as_any().downcast_ref::<Array>().unwrap();
        assert_eq!(concrete.len(), 4);
        assert!(header::equal(&concrete.get_at(1).unwrap(), &Null::shared()));
    }

    #[test]
    fn dictionary_with_nested_null_reconstructs() {
        let json = serde_json::json!({
            "users": [{"id": 1, "email": null}, {"id": 2, "name": null}],
            "metadata": null,
        });
        let dict = from_untyped(&json);
        let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
        assert!(header::equal(&concrete.get("metadata").unwrap(), &Null::shared()));
        let users = concrete.get("users").unwrap();
        let users = users.as_any().downcast_ref::<Array>().unwrap();
        let user0 = users.get_at(0).unwrap();
        let user0 = user0.as_any().downcast_ref::<Dictionary>().unwrap();
        assert!(header::equal(&user0.get("email").unwrap(), &Null::shared()));
        let user1 = users.get_at(1).unwrap();
        let user1 = user1.as_any().downcast_ref::<Dictionary>().unwrap();
        assert!(header::equal(&user1.get("name").unwrap(), &Null::shared()));
    }
}
