// crates/adapt/src/mql/eval.rs

use serde_json::Value as Json;
use std::cmp::Ordering;

use crate::mql::ast::{CmpOp, Filter};

/// Resolve a dotted field path (e.g. "slug.current") into a nested JSON value.
///
/// Returns `None` if any segment is missing. An explicit `null` counts as
/// missing, so `{ "author": null }` sorts and filters like no author.
pub fn field_value<'a>(doc: &'a Json, path: &str) -> Option<&'a Json> {
    let mut current = doc;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    (!current.is_null()).then_some(current)
}

/// Order two values of the same JSON kind; `None` for mismatched kinds.
pub(crate) fn compare_values(a: &Json, b: &Json) -> Option<Ordering> {
    match (a, b) {
        (Json::Number(na), Json::Number(nb)) => na.as_f64()?.partial_cmp(&nb.as_f64()?),
        (Json::String(sa), Json::String(sb)) => Some(sa.cmp(sb)),
        (Json::Bool(ba), Json::Bool(bb)) => Some(ba.cmp(bb)),
        _ => None,
    }
}

/// Evaluate a single comparison operator against an optional JSON value.
fn eval_cmp(op: &CmpOp, actual: Option<&Json>) -> bool {
    use CmpOp::*;

    match op {
        Eq(expected) => actual == Some(expected),
        Ne(expected) => actual != Some(expected),

        Gt(expected) => ordered(actual, expected, Ordering::is_gt),
        Gte(expected) => ordered(actual, expected, Ordering::is_ge),
        Lt(expected) => ordered(actual, expected, Ordering::is_lt),
        Lte(expected) => ordered(actual, expected, Ordering::is_le),

        In(list) => actual.is_some_and(|a| list.contains(a)),
        Nin(list) => !actual.is_some_and(|a| list.contains(a)),

        // for array fields
        All(values) => match actual {
            Some(Json::Array(arr)) => values.iter().all(|v| arr.contains(v)),
            _ => false,
        },

        Exists(flag) => actual.is_some() == *flag,

        // for arrays or strings
        Size(expected_len) => match actual {
            Some(Json::Array(arr)) => arr.len() as i64 == *expected_len,
            Some(Json::String(s)) => s.chars().count() as i64 == *expected_len,
            _ => false,
        },

        Not(inner) => !eval_cmp(inner, actual),
    }
}

fn ordered(actual: Option<&Json>, expected: &Json, pred: fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|a| compare_values(a, expected))
        .is_some_and(pred)
}

/// True when some `{ "_ref": id }` appears anywhere inside `doc`.
pub fn references(doc: &Json, id: &str) -> bool {
    match doc {
        Json::Object(map) => {
            map.get("_ref").and_then(Json::as_str) == Some(id)
                || map.values().any(|v| references(v, id))
        }
        Json::Array(items) => items.iter().any(|v| references(v, id)),
        _ => false,
    }
}

/// Evaluate a full Filter against a document.
pub fn eval_filter(filter: &Filter, doc: &Json) -> bool {
    use Filter::*;

    match filter {
        Field(expr) => eval_cmp(&expr.op, field_value(doc, &expr.path)),
        References(id) => references(doc, id),
        And(filters) => filters.iter().all(|f| eval_filter(f, doc)),
        Or(filters) => filters.iter().any(|f| eval_filter(f, doc)),
    }
}
