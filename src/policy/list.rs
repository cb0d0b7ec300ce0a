//! List filter adapter.

use serde_json::Value;

/// Apply `f` uniformly over an optional record-or-list value.
///
/// Absent input yields an empty array; a single (non-array) record delegates
/// straight to `f`; an array produces a new array with order preserved.
/// `f` is a closure so per-record context (the winding stage gate) is bound
/// by the caller, never smeared across a heterogeneous list.
pub fn filter_list<F>(items: Option<&Value>, f: F) -> Value
where
    F: Fn(&Value) -> Value,
{
    match items {
        None | Some(Value::Null) => Value::Array(Vec::new()),
        Some(Value::Array(records)) => Value::Array(records.iter().map(|r| f(r)).collect()),
        Some(single) => f(single),
    }
}
