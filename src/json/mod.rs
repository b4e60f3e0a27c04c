//! JSON serialization protocol (`spec.md` §4.3, component L).
//!
//! Split into [`typed`] (self-describing, registry-driven) and
//! [`untyped`] (lossy, shape-driven) halves, mirroring the two-mode
//! boolean `typed` parameter every concrete type's `to_json` takes.

pub mod typed;
pub mod untyped;

pub use typed::{from_typed, TypedFactory};
pub use untyped::from_untyped;
