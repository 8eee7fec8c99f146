// crates/adapt/src/mql/bind.rs

use regex::Regex;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::Error;

/// A whole string value of the form `$name`. Operator keys (`$in`, `$and`)
/// are object keys and never go through this.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$(?P<name>[A-Za-z_][A-Za-z0-9_]*)$").unwrap());

/// Replace every `"$name"` string value in `filter` with `params["name"]`.
///
/// Object keys are left alone, so operators survive untouched. A placeholder
/// without a parameter is an error rather than a silent non-match.
pub fn bind_params(filter: &Json, params: &BTreeMap<String, Json>) -> Result<Json, Error> {
    match filter {
        Json::String(s) => match PLACEHOLDER.captures(s) {
            Some(caps) => {
                let name = &caps["name"];
                params
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UnboundParam(name.to_string()))
            }
            None => Ok(filter.clone()),
        },
        Json::Array(items) => items
            .iter()
            .map(|item| bind_params(item, params))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        Json::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), bind_params(v, params)?);
            }
            Ok(Json::Object(out))
        }
        _ => Ok(filter.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Json)]) -> BTreeMap<String, Json> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn binds_nested_placeholders() {
        let filter = json!({
            "_type": "post",
            "slug.current": "$slug",
            "$or": [{ "views": { "$gt": "$min" } }]
        });
        let bound = bind_params(
            &filter,
            &params(&[("slug", json!("crime-news")), ("min", json!(10))]),
        )
        .unwrap();

        assert_eq!(bound["slug.current"], "crime-news");
        assert_eq!(bound["$or"][0]["views"]["$gt"], 10);
        assert_eq!(bound["_type"], "post");
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let err = bind_params(&json!({ "$references": "$categoryId" }), &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnboundParam(name) if name == "categoryId"));
    }

    #[test]
    fn only_whole_string_placeholders_are_bound() {
        let filter = json!({ "title": "costs $5", "code": "$1abc" });
        let bound = bind_params(&filter, &BTreeMap::new()).unwrap();
        assert_eq!(bound, filter);
    }
}
