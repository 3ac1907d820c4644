//! Structural equality for JSON values
//!
//! Differs from `Value`'s `PartialEq` only for numbers: `1` and `1.0` are
//! equal here, since snapshots may come from engines that widen integers.
//!
//! Arrays are compared positionally. The diff itself uses multiset matching
//! (see [`crate::diff`]); positional equality only decides "changed or not".

use serde_json::{Number, Value};

/// Deep structural equality.
///
/// - scalars compare by value (numbers numerically)
/// - arrays: same length and pairwise equal at each index
/// - objects: same key count and every key present in both with equal values
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| deep_equal(x, y)))
        }
        _ => false,
    }
}

/// Optional-snapshot variant: two absent values are equal
pub(crate) fn snapshots_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => deep_equal(x, y),
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
