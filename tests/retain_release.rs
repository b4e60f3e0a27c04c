//! Lifecycle properties (`spec.md` §8): retain/release balance and deep
//! copy identity/independence.

use octypes::{deep_copy, equal, release, retain, retain_count, Array, Boolean, Number, OCString};

#[test]
fn retain_release_balances_back_to_one() {
    let s = OCString::create("hello");
    assert_eq!(retain_count(&s), 1);
    let r1 = retain(&s);
    let r2 = retain(&s);
    assert_eq!(retain_count(&s), 3);
    release(r1);
    assert_eq!(retain_count(&s), 2);
    release(r2);
    assert_eq!(retain_count(&s), 1);
}

#[test]
fn static_singletons_never_reach_a_zero_count() {
    let a = Boolean::truthy();
    let b = retain(&a);
    assert!(retain_count(&a) >= 2);
    release(b);
}

#[test]
fn deep_copy_is_independent_for_mutable_containers() {
    let arr = Array::create(vec![Number::create_sint32(1), Number::create_sint32(2)]);
    let copy = deep_copy(&arr);
    assert!(equal(&arr, &copy));

    let arr_concrete = arr.as_any().downcast_ref::<Array>().unwrap();
    arr_concrete.append(Number::create_sint32(3));
    assert!(!equal(&arr, &copy));
}
