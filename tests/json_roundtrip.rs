//! Typed and untyped JSON round-trips over nested heterogeneous
//! structures (`spec.md` §4.3, §8).

use octypes::{equal, from_typed, from_untyped, Array, Boolean, Dictionary, Null, Number, OCString};

fn sample_structure() -> octypes::OCValue {
    let dict = Dictionary::create_mutable(0);
    let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
    concrete.set("name", OCString::create("sensor-1"));
    concrete.set("active", Boolean::truthy());
    concrete.set("calibration", Null::shared());
    concrete.set(
        "readings",
        Array::create(vec![
            Number::create_float64(1.5),
            Number::create_float64(2.25),
            Number::create_float64(-0.6),
        ]),
    );
    let nested = Array::create(vec![dict]);
    nested
}

#[test]
fn typed_json_round_trips_nested_heterogeneous_structure() {
    let original = sample_structure();
    let json = original.to_json(true).unwrap();
    let reconstructed = from_typed(&json).unwrap();
    assert!(equal(&original, &reconstructed));
}

#[test]
fn untyped_json_preserves_shape_but_loses_type_identity() {
    let original = sample_structure();
    let json = original.to_json(false).unwrap();
    let reconstructed = from_untyped(&json);

    let array = reconstructed.as_any().downcast_ref::<Array>().unwrap();
    assert_eq!(array.len(), 1);
    let dict = array.get_at(0).unwrap();
    let dict = dict.as_any().downcast_ref::<Dictionary>().unwrap();
    assert!(equal(&dict.get("calibration").unwrap(), &Null::shared()));
    assert!(equal(&dict.get("active").unwrap(), &Boolean::truthy()));

    let readings = dict.get("readings").unwrap();
    let readings = readings.as_any().downcast_ref::<Array>().unwrap();
    assert_eq!(readings.len(), 3);
}

#[test]
fn object_without_type_tag_is_rejected_by_typed_reconstruction() {
    let json = serde_json::json!({"foo": "bar"});
    assert!(from_typed(&json).is_err());
}
