//! Dictionary equality is order-independent even though iteration order
//! is insertion order (`spec.md` §4.4.2, §8).

use octypes::{equal, Boolean, Dictionary, Number};

#[test]
fn equality_ignores_insertion_order() {
    let a = Dictionary::create_mutable(0);
    let ac = a.as_any().downcast_ref::<Dictionary>().unwrap();
    ac.set("x", Number::create_sint32(1));
    ac.set("y", Boolean::truthy());

    let b = Dictionary::create_mutable(0);
    let bc = b.as_any().downcast_ref::<Dictionary>().unwrap();
    bc.set("y", Boolean::truthy());
    bc.set("x", Number::create_sint32(1));

    assert!(equal(&a, &b));
}

#[test]
fn keys_and_values_preserve_insertion_order() {
    let dict = Dictionary::create_mutable(0);
    let concrete = dict.as_any().downcast_ref::<Dictionary>().unwrap();
    concrete.set("first", Number::create_sint32(1));
    concrete.set("second", Number::create_sint32(2));

    let (keys, _values) = concrete.keys_and_values();
    assert_eq!(keys.len(), 2);
}
