//! `from_typed` must be able to reconstruct every registered container
//! type from a literal JSON node even when this process has never
//! *constructed* that concrete type before (`spec.md` §4.1/§6). Each
//! file under `tests/` compiles to its own process, so this file
//! deliberately never calls `Array::create`, `OCData::create`, etc.
//! before handing `from_typed` a hand-written JSON node naming them.

use octypes::from_typed;

#[test]
fn reconstructs_every_factory_type_without_prior_construction() {
    let array = from_typed(&serde_json::json!({
        "type": "OCArray",
        "value": [{"type": "OCNumber", "subtype": "int32", "value": 1}],
    }));
    assert!(array.is_ok());

    let number = from_typed(&serde_json::json!({
        "type": "OCNumber",
        "subtype": "float64",
        "value": 3.5,
    }));
    assert!(number.is_ok());

    let data = from_typed(&serde_json::json!({
        "type": "OCData",
        "encoding": "base64",
        "value": "AQID",
    }));
    assert!(data.is_ok());

    let dict = from_typed(&serde_json::json!({
        "type": "OCDictionary",
        "value": {"a": {"type": "OCNumber", "subtype": "int8", "value": 1}},
    }));
    assert!(dict.is_ok());

    let set = from_typed(&serde_json::json!({
        "type": "OCSet",
        "value": [{"type": "OCNumber", "subtype": "int8", "value": 1}],
    }));
    assert!(set.is_ok());

    let index_set = from_typed(&serde_json::json!({
        "type": "OCIndexSet",
        "encoding": "none",
        "value": [1, 2, 3],
    }));
    assert!(index_set.is_ok());

    let index_array = from_typed(&serde_json::json!({
        "type": "OCIndexArray",
        "encoding": "none",
        "value": [1, 1, 2],
    }));
    assert!(index_array.is_ok());

    let index_pair_set = from_typed(&serde_json::json!({
        "type": "OCIndexPairSet",
        "encoding": "none",
        "value": [1, 10, 2, 20],
    }));
    assert!(index_pair_set.is_ok());
}
