//! The object header and lifecycle (`spec.md` §3.1, §4.2).
//!
//! `spec.md` §9 flags the original's per-object function-pointer table
//! (`finalize`/`equal`/`copyFormattingDesc`/…) as the one piece that most
//! wants re-architecture in a systems language, and names the fix
//! directly: "a small polymorphic capability (trait with `retain`,
//! `release`, `equal`, `describe`), carried either by monomorphizing the
//! container … or by a single variant `ElementKind`". This crate takes
//! that trait route: [`ValueObj`] *is* the header — every concrete type
//! in `spec.md` §3.2 implements it once, and every container (`Array`,
//! `Dictionary`, `Set`, …) stores elements as `Rc<dyn ValueObj>` and
//! dispatches through the trait instead of through a copied callback
//! struct per container instance.
//!
//! Reference counting itself is `Rc`'s own strong count — `retain` is
//! `Rc::clone`, `release` is an ordinary drop. Static singletons
//! (`spec.md` §3.4 — booleans, null, interned strings) are held alive by
//! one permanent `Rc` in a process-wide `OnceLock`, so their strong count
//! never reaches zero; [`ValueObj::is_static`] reports this so that
//! `deep_copy` can preserve identity instead of cloning, matching the
//! "retain/release on a static object is a no-op" contract without
//! needing a distinguished zero-count state the way the original C
//! `retainCount` field did.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::error::OCError;
use crate::registry::TypeId;

/// A handle to any value object in the runtime: `Rc<dyn ValueObj>`.
///
/// Cloning an `OCValue` is [`retain`]; letting the last clone drop is
/// [`release`]. This alias exists so call sites read like the spec's
/// prose ("an `OCValue`") instead of the generic `Rc<dyn ValueObj>`.
pub type OCValue = Rc<dyn ValueObj>;

/// The capability every concrete value type implements: the C header's
/// `equal`/`finalize`/`copyFormattingDesc`/`copyDeep`/`copyJSON` fields,
/// now a vtable Rust already builds for us via `dyn ValueObj`.
pub trait ValueObj: fmt::Debug {
    /// The registry id for this object's concrete type (`spec.md` §4.1).
    fn type_id(&self) -> TypeId;

    /// Downcasting escape hatch for container code that needs to recover
    /// a concrete type (e.g. the homogeneous-numeric-array fast path).
    fn as_any(&self) -> &dyn Any;

    /// Deep, type-bounded structural equality (`spec.md` §3.3).
    ///
    /// Implementations must check `other.type_id() == self.type_id()`
    /// first (or rely on `as_any` downcasting failing) — equality across
    /// differing concrete types is always `false`.
    fn equal(&self, other: &dyn ValueObj) -> bool;

    /// A human-readable single-object summary (`spec.md` §3.1).
    ///
    /// The default mirrors the original's fallback formatter
    /// (`OCTypeCopyFormattingDesc`'s un-overridden case in `OCString.c`):
    /// `"<TypeName 0xID>"`, where `ID` is a stable per-object serial
    /// number standing in for the C pointer value Rust does not expose.
    fn describe(&self) -> String {
        let name = crate::registry::TypeRegistry::name_of(self.type_id()).unwrap_or("Unknown");
        format!("<{name} {:#x}>", self as *const Self as *const () as usize)
    }

    /// Structural deep copy (`spec.md` §4.2). Static singletons must
    /// override this to return `self` wrapped in a fresh `Rc` pointing at
    /// the *same* allocation (i.e. `Rc::clone`), not a duplicate.
    fn copy_deep(&self) -> OCValue;

    /// Whether this object is a static/permanent singleton whose strong
    /// count never reaches zero (`spec.md` §3.1's `retain_count == 0`).
    fn is_static(&self) -> bool {
        false
    }

    /// Serialize to typed or untyped JSON (`spec.md` §4.3).
    fn to_json(&self, typed: bool) -> Result<Json, OCError>;
}

/// `retain(obj)` (`spec.md` §4.2): bumps the `Rc` strong count.
///
/// A no-op in effect on static singletons, since they are always backed
/// by at least one permanent `Rc` the registry holds forever.
pub fn retain(obj: &OCValue) -> OCValue {
    Rc::clone(obj)
}

/// `release(obj)` (`spec.md` §4.2): dropping `obj` decrements the count;
/// when it reaches zero, `Drop` on the concrete type runs (the
/// finalizer) and the allocation is freed. Provided for call sites that
/// want the spec's explicit vocabulary instead of an implicit scope exit.
pub fn release(obj: OCValue) {
    drop(obj);
}

/// The current strong-reference count, standing in for `spec.md`'s
/// `retain_count` field. Static singletons report a count that never
/// reaches zero because the registry's permanent handle counts too.
pub fn retain_count(obj: &OCValue) -> usize {
    Rc::strong_count(obj)
}

/// `deep_copy(obj)` (`spec.md` §4.2): static singletons return the same
/// pointer; everything else dispatches to [`ValueObj::copy_deep`].
pub fn deep_copy(obj: &OCValue) -> OCValue {
    obj.copy_deep()
}

/// Structural equality between two handles, dispatching through the
/// header (`spec.md` §3.3): type ids must match and then the concrete
/// `equal` callback decides.
pub fn equal(a: &OCValue, b: &OCValue) -> bool {
    a.type_id() == b.type_id() && a.equal(b.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::Boolean;
    use crate::string::OCString;

    #[test]
    fn retain_count_tracks_clones() {
        let s = OCString::create("hello");
        assert_eq!(retain_count(&s), 1);
        let s2 = retain(&s);
        assert_eq!(retain_count(&s), 2);
        release(s2);
        assert_eq!(retain_count(&s), 1);
    }

    #[test]
    fn deep_copy_of_static_is_identity() {
        let t1 = Boolean::truthy();
        let t2 = deep_copy(&t1);
        assert!(Rc::ptr_eq(&t1, &t2));
    }

    #[test]
    fn deep_copy_of_non_static_is_independent() {
        let s = OCString::create("hello");
        let copy = deep_copy(&s);
        assert!(!Rc::ptr_eq(&s, &copy));
        assert!(equal(&s, &copy));
    }
}
