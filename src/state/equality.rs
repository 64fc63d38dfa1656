//! Structural equality over queued entries.
//!
//! This is the deduplication key for the whole queue, so it is spelled out
//! field by field instead of being derived. Two entries are the same when
//! their kinds match, their payloads are deeply equal, and every metadata
//! field matches.
//!
//! JSON values compare the way a client that produced them would: object key
//! order is irrelevant, array order matters, and `1` equals `1.0`. A float
//! equals an integer only when it is integral and denotes exactly that
//! integer, so equality stays transitive for integers beyond 2^53.

use serde_json::{Map, Number, Value};

use crate::types::{EntryMeta, Payload, QueuedEntry};

/// Returns true if two entries are structurally equal.
pub fn same_entry(a: &QueuedEntry, b: &QueuedEntry) -> bool {
    a.kind == b.kind && same_payload(&a.payload, &b.payload) && same_meta(&a.meta, &b.meta)
}

/// Deep equality of two opaque payloads.
pub fn same_payload(a: &Payload, b: &Payload) -> bool {
    same_value(a.as_value(), b.as_value())
}

/// Field-wise equality of entry metadata.
///
/// `dismiss` is compared as an ordered list.
pub fn same_meta(a: &EntryMeta, b: &EntryMeta) -> bool {
    a.retry == b.retry
        && a.dismiss == b.dismiss
        && a.appointment_id == b.appointment_id
        && same_object(&a.extra, &b.extra)
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => same_number(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => same_object(x, y),
        _ => false,
    }
}

fn same_number(x: &Number, y: &Number) -> bool {
    match (exact_integer(x), exact_integer(y)) {
        (Some(p), Some(q)) => p == q,
        (Some(n), None) => y.as_f64().is_some_and(|f| float_is_integer(f, n)),
        (None, Some(n)) => x.as_f64().is_some_and(|f| float_is_integer(f, n)),
        (None, None) => matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q),
    }
}

fn exact_integer(n: &Number) -> Option<i128> {
    n.as_u64()
        .map(i128::from)
        .or_else(|| n.as_i64().map(i128::from))
}

// 2^64, the first value past every u64.
const INTEGER_RANGE_END: f64 = 18_446_744_073_709_551_616.0;

fn float_is_integer(f: f64, n: i128) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < INTEGER_RANGE_END && f as i128 == n
}

fn same_object(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, x)| b.get(key).is_some_and(|y| same_value(x, y)))
}
