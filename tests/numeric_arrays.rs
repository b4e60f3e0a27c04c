//! Homogeneous numeric array encoding and number/array/data interop
//! (`spec.md` §4.5, §8 scenarios 3/4/9).

use octypes::{array_from_data, data_from_array, equal, Array, Number, NumberType, OCData};

#[test]
fn homogeneous_real_array_round_trips_through_typed_json() {
    let array = Array::create(vec![
        Number::create_float64(1.0),
        Number::create_float64(2.0),
        Number::create_float64(3.0),
    ]);
    let json = array.to_json(true).unwrap();
    assert_eq!(json["element_type"], "float64");
    assert_eq!(json["value"], serde_json::json!([1.0, 2.0, 3.0]));
}

#[test]
fn homogeneous_complex_array_flattens_to_real_imag_pairs() {
    let array = Array::create(vec![
        Number::create_complex128(1.0, 2.0),
        Number::create_complex128(3.0, 4.0),
    ]);
    let json = array.to_json(true).unwrap();
    assert_eq!(json["element_type"], "complex128");
    assert_eq!(json["value"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
}

#[test]
fn mixed_type_array_has_no_homogeneous_fast_path() {
    let array = Array::create(vec![Number::create_sint32(1), octypes::Boolean::truthy()]);
    let concrete = array.as_any().downcast_ref::<Array>().unwrap();
    assert!(concrete.homogeneous_number_type().is_none());
}

#[test]
fn data_to_array_and_back_preserves_values() {
    let values: [i32; 4] = [10, -20, 30, -40];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let data = OCData::create(&bytes);

    let array = array_from_data(&data, NumberType::SInt32).unwrap();
    let arr_concrete = array.as_any().downcast_ref::<Array>().unwrap();
    assert_eq!(arr_concrete.len(), 4);

    let round_tripped = data_from_array(&array, NumberType::SInt32).unwrap();
    assert!(equal(&data, &round_tripped));
}

#[test]
fn base64_round_trips_every_length_one_to_twenty() {
    for len in 1..=20 {
        let bytes: Vec<u8> = (0..len as u8).collect();
        let data = OCData::create(&bytes);
        let json = data.to_json(true).unwrap();
        let back = octypes::from_typed(&json).unwrap();
        assert!(equal(&data, &back), "round trip failed at length {len}");
    }
}
