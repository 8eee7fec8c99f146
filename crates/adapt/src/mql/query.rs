use chrono::{DateTime, FixedOffset};
use serde_json::Value as Json;
use serve::{Cardinality, Params, Query};
use std::cmp::Ordering;
use tracing::debug;

use super::bind::bind_params;
use super::eval::{compare_values, eval_filter, field_value};
use super::parser::{parse_filter, parse_sort};
use crate::Error;

/// Hard internal cap for safety; callers can pass a smaller explicit limit.
pub const MAX_LIMIT: usize = 1000;

/// Run `query` over `docs`.
///
/// 1. Bind `params` into the filter and parse it.
/// 2. Evaluate the filter against each raw document.
/// 3. Dereference the `expand` paths of every match through `resolve`.
/// 4. Apply sort + skip + limit in-memory.
/// 5. Shape the answer by cardinality: a document or `null`, or an array.
pub fn execute<'a, R>(
    docs: &'a [Json],
    resolve: R,
    query: &Query,
    params: &Params,
) -> Result<Json, Error>
where
    R: Fn(&str) -> Option<&'a Json>,
{
    let bound = bind_params(&query.filter, params)?;
    let filter = parse_filter(&bound)?;
    parse_sort(&query.sort)?;

    let expand: Vec<Vec<&str>> = query
        .expand
        .iter()
        .map(|path| path.split('.').collect())
        .collect();

    let mut matched: Vec<Json> = docs
        .iter()
        .filter(|doc| eval_filter(&filter, doc))
        .map(|doc| {
            let mut doc = doc.clone();
            for segments in &expand {
                expand_path(&mut doc, segments, &resolve);
            }
            doc
        })
        .collect();
    let total = matched.len();

    apply_sort(&mut matched, &query.sort);
    let page = apply_skip_limit(matched, query.skip, query.limit);
    debug!(total, returned = page.len(), "query executed");

    Ok(match query.cardinality {
        Cardinality::One => page.into_iter().next().unwrap_or(Json::Null),
        Cardinality::Many => Json::Array(page),
    })
}

/// Replace `{ "_ref": id }` values at `segments` with the referenced document.
///
/// Arrays along the path are walked element-wise. A single dangling
/// reference becomes `null`; dangling references inside an array are dropped.
fn expand_path<'a, R>(value: &mut Json, segments: &[&str], resolve: &R)
where
    R: Fn(&str) -> Option<&'a Json>,
{
    match segments.split_first() {
        None => match value {
            Json::Array(items) => {
                items.retain_mut(|item| match ref_id(item) {
                    Some(id) => match resolve(id.as_str()) {
                        Some(target) => {
                            *item = target.clone();
                            true
                        }
                        None => false,
                    },
                    None => true,
                });
            }
            _ => {
                if let Some(id) = ref_id(value) {
                    *value = resolve(id.as_str()).cloned().unwrap_or(Json::Null);
                }
            }
        },
        Some((head, rest)) => match value {
            Json::Object(map) => {
                if let Some(child) = map.get_mut(*head) {
                    expand_path(child, rest, resolve);
                }
            }
            Json::Array(items) => {
                for item in items {
                    expand_path(item, segments, resolve);
                }
            }
            _ => {}
        },
    }
}

fn ref_id(value: &Json) -> Option<String> {
    value.get("_ref").and_then(Json::as_str).map(str::to_owned)
}

/// Apply sort clauses in-place.
///
/// `sort` is a Vec<(field_path, dir)> where dir is 1 (asc) or -1 (desc).
/// The sort is stable, so ties keep dataset order.
fn apply_sort(docs: &mut [Json], sort: &[(String, i8)]) {
    if sort.is_empty() || docs.len() <= 1 {
        return;
    }

    docs.sort_by(|a, b| {
        for (field, dir) in sort {
            let ord = compare_field(a, b, field);
            if ord != Ordering::Equal {
                return if *dir >= 0 { ord } else { ord.reverse() };
            }
        }
        Ordering::Equal
    });
}

/// Compare a single field across two docs. Missing sorts first.
fn compare_field(a: &Json, b: &Json, field: &str) -> Ordering {
    match (field_value(a, field), field_value(b, field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Json::String(sa)), Some(Json::String(sb))) => {
            // Timestamps rank before other strings so the order stays total.
            match (parse_timestamp(sa), parse_timestamp(sb)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => sa.cmp(sb),
            }
        }
        (Some(va), Some(vb)) => {
            compare_values(va, vb).unwrap_or_else(|| kind_rank(va).cmp(&kind_rank(vb)))
        }
    }
}

// Timestamps with differing precision ("…:00Z" vs "…:00.000Z") must not
// compare lexically.
fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn kind_rank(v: &Json) -> u8 {
    match v {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}

/// Apply skip + limit to a vector, returning a new owned Vec.
fn apply_skip_limit(mut docs: Vec<Json>, skip: Option<usize>, limit: Option<usize>) -> Vec<Json> {
    let total = docs.len();
    let start = skip.unwrap_or(0).min(total);
    let requested = limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
    let end = start.saturating_add(requested).min(total);

    if start >= end {
        return Vec::new();
    }

    docs.drain(start..end).collect()
}
