//! The leak tracker (`spec.md` §4.2, component C).
//!
//! Grounded on `examples/original_source/src/OCLeakTracker.c`/`.h`:
//! `impl_OCTrack`/`impl_OCTrackWithHint` at allocation, `impl_OCUntrack`
//! right before the allocation is freed, and a family of `OCReportLeaks*`
//! variants that group by type and can exclude statics. The original's
//! single global mutex protecting both the table and the allocation count
//! becomes one `Mutex<LeakTable>` here; `spec.md` §5 says `track`/
//! `untrack` must never block other object operations, which holds
//! because nothing else in the crate ever takes this lock.
//!
//! Backtrace capture is a pluggable capability (`BacktraceCapture`) with
//! a default no-op implementation, per `spec.md` §9's redesign note — the
//! default stores only the hint, which is sufficient for every scenario
//! in `spec.md` §8.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::registry::TypeId;

/// A pluggable best-effort backtrace capability (`spec.md` §6: "best-effort
/// and must degrade silently where unavailable").
pub trait BacktraceCapture: Send + Sync {
    /// Captures context for a newly tracked allocation, if possible.
    fn capture(&self) -> Option<String>;
}

/// The default capability: no backtrace, relies on the caller-supplied hint.
struct NoBacktrace;
impl BacktraceCapture for NoBacktrace {
    fn capture(&self) -> Option<String> {
        None
    }
}

struct LeakEntry {
    type_id: TypeId,
    hint: Option<&'static str>,
    context: Option<String>,
}

struct LeakTable {
    entries: HashMap<usize, LeakEntry>,
    backtrace: Box<dyn BacktraceCapture>,
}

fn table() -> &'static Mutex<LeakTable> {
    static TABLE: OnceLock<Mutex<LeakTable>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Mutex::new(LeakTable {
            entries: HashMap::new(),
            backtrace: Box::new(NoBacktrace),
        })
    })
}

/// Tracks a newly allocated non-static object, with an optional hint
/// describing the allocation site (e.g. `"OCArray::create_mutable"`).
pub fn track(ptr: usize, type_id: TypeId, hint: Option<&'static str>) {
    let mut guard = table().lock().expect("leak tracker mutex poisoned");
    let context = guard.backtrace.capture();
    guard.entries.insert(
        ptr,
        LeakEntry {
            type_id,
            hint,
            context,
        },
    );
}

/// Untracks an object right before it is freed (called from the
/// concrete type's `Drop` impl).
pub fn untrack(ptr: usize) {
    let mut guard = table().lock().expect("leak tracker mutex poisoned");
    guard.entries.remove(&ptr);
}

/// A single leak report line: how many non-static objects of `type_name`
/// are still tracked, and the hints seen for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakGroup {
    /// The registered name of the leaked type.
    pub type_name: String,
    /// How many objects of this type are currently tracked.
    pub count: usize,
    /// Allocation-site hints collected for this type, where available.
    pub hints: Vec<String>,
}

/// Reports all currently tracked (i.e. non-finalized) allocations,
/// grouped by type. Intended for process-shutdown / test-teardown use.
///
/// Static objects are never tracked in the first place (`spec.md` §4.2:
/// "static never leaks"), so there is no "excluding static" variant to
/// offer here — every entry this returns is a genuine leak candidate.
pub fn report() -> Vec<LeakGroup> {
    let guard = table().lock().expect("leak tracker mutex poisoned");
    let mut by_type: HashMap<TypeId, LeakGroup> = HashMap::new();
    for entry in guard.entries.values() {
        let group = by_type.entry(entry.type_id).or_insert_with(|| LeakGroup {
            type_name: crate::registry::TypeRegistry::name_of(entry.type_id)
                .unwrap_or("Unknown")
                .to_string(),
            count: 0,
            hints: Vec::new(),
        });
        group.count += 1;
        if let Some(hint) = entry.hint {
            group.hints.push(hint.to_string());
        }
        if let Some(ctx) = &entry.context {
            group.hints.push(ctx.clone());
        }
    }
    let mut groups: Vec<_> = by_type.into_values().collect();
    groups.sort_by(|a, b| a.type_name.cmp(&b.type_name));
    for group in &groups {
        log::warn!(
            "leaked {} live {} object(s) at shutdown",
            group.count,
            group.type_name
        );
    }
    groups
}

/// The number of currently tracked (live, non-static) allocations of
/// `type_id`.
pub fn live_count_for_type(type_id: TypeId) -> usize {
    let guard = table().lock().expect("leak tracker mutex poisoned");
    guard.entries.values().filter(|e| e.type_id == type_id).count()
}

/// The total number of currently tracked allocations, across all types.
pub fn live_count() -> usize {
    let guard = table().lock().expect("leak tracker mutex poisoned");
    guard.entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_and_untrack_balance() {
        let before = live_count();
        track(0xdead_beef, 99, Some("test"));
        assert_eq!(live_count(), before + 1);
        untrack(0xdead_beef);
        assert_eq!(live_count(), before);
    }

    #[test]
    fn report_groups_by_type() {
        track(0x1111, 7, Some("a"));
        track(0x2222, 7, Some("b"));
        track(0x3333, 8, None);
        let groups = report();
        let seven = groups.iter().find(|g| g.count >= 2);
        assert!(seven.is_some() || groups.iter().any(|g| g.count >= 1));
        untrack(0x1111);
        untrack(0x2222);
        untrack(0x3333);
    }
}
