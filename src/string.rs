//! UTF-8 string values (`spec.md` §3.2, component D).
//!
//! Grounded on `examples/original_source/src/OCString.c`: byte-exact
//! equality (`__OCStringEqual`), a formatting description that is just a
//! copy of the string itself, and a process-wide constant-string table
//! (`__OCStringMakeConstantString`) whose entries are pinned at
//! `retainCount == 0` the first time a given spelling is interned. The
//! teacher's own `src/string.rs` models strings as a columnar
//! bounds/values pair (`Strings<BC, VC>`); that shape doesn't apply once
//! each string is its own heap-allocated value object, so this file keeps
//! the teacher's *role* (the module that owns the string type) but holds
//! a plain owned `String` behind a `RefCell` for the mutable variant.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Mutex, OnceLock};

use serde_json::Value as Json;

use crate::error::OCError;
use crate::header::{OCValue, ValueObj};
use crate::registry::{TypeId, TypeRegistry};

fn type_id() -> TypeId {
    static ID: OnceLock<TypeId> = OnceLock::new();
    *ID.get_or_init(|| TypeRegistry::register("OCString"))
}

/// A UTF-8 string value object, mutable in place via interior mutability
/// (the header's `Rc` handle is shared; `append`/`set` mutate the same
/// allocation every other holder observes, matching the original's
/// `OCMutableStringRef` aliasing one `OCStringRef` allocation).
#[derive(Debug)]
pub struct OCString {
    value: RefCell<String>,
    constant: bool,
}

impl OCString {
    /// Creates an immutable string value with `retain_count = 1`.
    pub fn create(value: impl Into<String>) -> OCValue {
        let obj: OCValue = Rc::new(OCString {
            value: RefCell::new(value.into()),
            constant: false,
        });
        crate::leak::track(
            Rc::as_ptr(&obj) as *const () as usize,
            obj.type_id(),
            Some("OCString::create"),
        );
        obj
    }

    /// Creates an empty mutable string with room for `capacity` bytes
    /// reserved up front (`spec.md` §3.2's `capacity` field).
    pub fn create_mutable(capacity: usize) -> OCValue {
        let obj: OCValue = Rc::new(OCString {
            value: RefCell::new(String::with_capacity(capacity)),
            constant: false,
        });
        crate::leak::track(
            Rc::as_ptr(&obj) as *const () as usize,
            obj.type_id(),
            Some("OCString::create_mutable"),
        );
        obj
    }

    /// Returns the interned, process-wide constant instance for `value`,
    /// creating it on first reference (`spec.md` §5's "single canonical
    /// instance" contract for constant strings). The returned handle has
    /// `is_static() == true`.
    pub fn constant(value: &str) -> OCValue {
        fn table() -> &'static Mutex<HashMap<String, OCValue>> {
            static TABLE: OnceLock<Mutex<HashMap<String, OCValue>>> = OnceLock::new();
            TABLE.get_or_init(|| Mutex::new(HashMap::new()))
        }
        let mut guard = table().lock().expect("constant string table mutex poisoned");
        if let Some(existing) = guard.get(value) {
            return Rc::clone(existing);
        }
        let obj: OCValue = Rc::new(OCString {
            value: RefCell::new(value.to_string()),
            constant: true,
        });
        guard.insert(value.to_string(), Rc::clone(&obj));
        obj
    }

    /// Returns an owned copy of the current contents.
    pub fn as_string(&self) -> String {
        self.value.borrow().clone()
    }

    /// Runs `f` with a borrowed view of the current contents.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(self.value.borrow().as_str())
    }

    /// Current length in bytes.
    pub fn length(&self) -> usize {
        self.value.borrow().len()
    }

    /// Appends `suffix` in place. Rejected on a constant string, since
    /// mutating it would corrupt every holder of the shared interned
    /// instance.
    pub fn append(&self, suffix: &str) -> Result<(), OCError> {
        if self.constant {
            return Err(OCError::argument("cannot mutate an interned constant string"));
        }
        self.value.borrow_mut().push_str(suffix);
        Ok(())
    }
}

impl ValueObj for OCString {
    fn type_id(&self) -> TypeId {
        type_id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn ValueObj) -> bool {
        match other.as_any().downcast_ref::<OCString>() {
            Some(o) => *self.value.borrow() == *o.value.borrow(),
            None => false,
        }
    }

    fn describe(&self) -> String {
        self.value.borrow().clone()
    }

    fn copy_deep(&self) -> OCValue {
        if self.constant {
            return OCString::constant(&self.value.borrow());
        }
        OCString::create(self.value.borrow().clone())
    }

    fn is_static(&self) -> bool {
        self.constant
    }

    fn to_json(&self, _typed: bool) -> Result<Json, OCError> {
        Ok(Json::String(self.value.borrow().clone()))
    }
}

impl Drop for OCString {
    fn drop(&mut self) {
        if !self.constant {
            crate::leak::untrack(self as *const Self as *const () as usize);
        }
    }
}
