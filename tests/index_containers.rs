//! Index container scenarios (`spec.md` §8 scenarios 7/8).

use octypes::{equal, from_typed, Encoding, IndexArray, IndexPairSet, IndexSet};

#[test]
fn index_set_range_queries_match_scenario_seven() {
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
fn index_pair_set_round_trips_under_both_encodings_scenario_eight() {
    for encoding in [Encoding::None, Encoding::Base64] {
        let set = IndexPairSet::create_mutable_with_encoding(encoding);
        let concrete = set.as_any().downcast_ref::<IndexPairSet>().unwrap();
        for (i, v) in [(1, 10), (2, 20), (3, 30)] {
            concrete.add_pair(i, v).unwrap();
        }
        let json = set.to_json(true).unwrap();
        let back = from_typed(&json).unwrap();
        assert!(equal(&set, &back));
    }
}

#[test]
fn index_array_preserves_order_and_duplicates() {
    let array = IndexArray::create_mutable();
    let concrete = array.as_any().downcast_ref::<IndexArray>().unwrap();
    for v in [3, 1, 3, 2] {
        concrete.append(v);
    }
    assert_eq!(concrete.count(), 4);
    assert_eq!(concrete.value_at(2), Some(3));
}
