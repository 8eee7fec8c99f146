// crates/adapt/src/mql/parser.rs

use super::ast::{CmpOp, FieldExpr, Filter};
use crate::Error;
use serde_json::Value as Json;

/// Parse a Mongo-style JSON filter into a Filter AST.
///
/// Placeholders must already be bound; see [`super::bind::bind_params`].
pub fn parse_filter(json: &Json) -> Result<Filter, Error> {
    match json {
        Json::Object(map) => {
            // top-level: fields & logical operators
            let mut filters = Vec::new();

            for (k, v) in map {
                match k.as_str() {
                    "$and" => filters.push(Filter::And(parse_list("$and", v)?)),
                    "$or" => filters.push(Filter::Or(parse_list("$or", v)?)),
                    "$references" => filters.push(parse_references(v)?),
                    op if op.starts_with('$') => {
                        return Err(Error::InvalidOperator(format!(
                            "unsupported top-level operator {op}"
                        )))
                    }
                    // field expression, implicit $eq or operator object
                    path => filters.push(parse_field_expr(path, v)?),
                }
            }

            if filters.len() == 1 {
                Ok(filters.remove(0))
            } else {
                Ok(Filter::And(filters))
            }
        }
        _ => Err(Error::invalid_filter("top-level filter must be an object")),
    }
}

fn parse_list(name: &str, value: &Json) -> Result<Vec<Filter>, Error> {
    match value {
        Json::Array(arr) => arr.iter().map(parse_filter).collect(),
        _ => Err(Error::InvalidFilter(format!("{name} value must be an array"))),
    }
}

fn parse_references(value: &Json) -> Result<Filter, Error> {
    match value {
        Json::String(id) if !id.is_empty() => Ok(Filter::References(id.clone())),
        _ => Err(Error::invalid_filter(
            "$references expects a non-empty document id",
        )),
    }
}

fn parse_field_expr(path: &str, v: &Json) -> Result<Filter, Error> {
    // Shorthand: { field: value } → Eq
    let obj = match v.as_object() {
        Some(obj) => obj,
        None => return Ok(Filter::field(path, CmpOp::Eq(v.clone()))),
    };

    if obj.is_empty() {
        return Err(Error::InvalidFilter(format!(
            "empty operator object for field {path}"
        )));
    }

    let mut and_ops = obj
        .iter()
        .map(|(op_name, op_val)| {
            parse_cmp_op(op_name, op_val).map(|op| {
                Filter::Field(FieldExpr {
                    path: path.to_string(),
                    op,
                })
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if and_ops.len() == 1 {
        Ok(and_ops.remove(0))
    } else {
        Ok(Filter::And(and_ops))
    }
}

fn parse_array(op_name: &str, value: &Json) -> Result<Vec<Json>, Error> {
    value
        .as_array()
        .cloned()
        .ok_or_else(|| Error::InvalidFilter(format!("{op_name} expects array")))
}

fn parse_cmp_op(op_name: &str, value: &Json) -> Result<CmpOp, Error> {
    use CmpOp::*;

    match op_name {
        "$eq" => Ok(Eq(value.clone())),
        "$ne" => Ok(Ne(value.clone())),
        "$gt" => Ok(Gt(value.clone())),
        "$gte" => Ok(Gte(value.clone())),
        "$lt" => Ok(Lt(value.clone())),
        "$lte" => Ok(Lte(value.clone())),
        "$in" => Ok(In(parse_array(op_name, value)?)),
        "$nin" => Ok(Nin(parse_array(op_name, value)?)),
        "$all" => Ok(All(parse_array(op_name, value)?)),
        "$exists" => value
            .as_bool()
            .map(Exists)
            .ok_or_else(|| Error::invalid_filter("$exists expects boolean")),
        "$size" => value
            .as_i64()
            .map(Size)
            .ok_or_else(|| Error::invalid_filter("$size expects integer")),
        "$not" => {
            // $not value is a single operator object over the same field
            let inner = value
                .as_object()
                .ok_or_else(|| Error::invalid_filter("$not expects object"))?;
            match inner.iter().next() {
                Some((inner_op, inner_val)) if inner.len() == 1 => {
                    Ok(Not(Box::new(parse_cmp_op(inner_op, inner_val)?)))
                }
                _ => Err(Error::invalid_filter(
                    "$not expects a single operator object",
                )),
            }
        }
        _ => Err(Error::InvalidOperator(format!(
            "unsupported operator {op_name}"
        ))),
    }
}

/// Validate `(path, direction)` sort clauses.
pub fn parse_sort(sort: &[(String, i8)]) -> Result<(), Error> {
    for (path, dir) in sort {
        if path.is_empty() {
            return Err(Error::InvalidSort("sort path must not be empty".into()));
        }
        if *dir != 1 && *dir != -1 {
            return Err(Error::InvalidSort(format!(
                "sort direction for {path} must be 1 or -1, got {dir}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_field(filter: &Filter) -> &FieldExpr {
        match filter {
            Filter::Field(fe) => fe,
            other => panic!("expected Filter::Field, got: {:?}", other),
        }
    }

    #[test]
    fn implicit_eq_single_field() {
        let f = parse_filter(&json!({ "_type": "category" })).unwrap();

        let fe = as_field(&f);
        assert_eq!(fe.path, "_type");
        assert_eq!(fe.op, CmpOp::Eq(json!("category")));
    }

    #[test]
    fn multiple_fields_become_and() {
        let f = parse_filter(&json!({ "_type": "post", "slug.current": "a" })).unwrap();

        match f {
            Filter::And(filters) => {
                let paths: Vec<&str> = filters.iter().map(|f| as_field(f).path.as_str()).collect();
                assert!(paths.contains(&"_type"));
                assert!(paths.contains(&"slug.current"));
            }
            other => panic!("expected top-level And, got: {:?}", other),
        }
    }

    #[test]
    fn empty_object_matches_everything() {
        assert_eq!(parse_filter(&json!({})).unwrap(), Filter::all());
    }

    #[test]
    fn top_level_must_be_object() {
        let err = parse_filter(&json!(["not-an-object"])).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn and_or_nest() {
        let f = parse_filter(&json!({
            "$and": [
                { "_type": "post" },
                { "$or": [{ "breakingNews": true }, { "views": { "$gt": 100 } }] }
            ]
        }))
        .unwrap();

        match f {
            Filter::And(list) => {
                assert_eq!(list.len(), 2);
                assert!(matches!(&list[1], Filter::Or(inner) if inner.len() == 2));
            }
            other => panic!("expected And, got: {:?}", other),
        }
    }

    #[test]
    fn logical_values_must_be_arrays() {
        let err = parse_filter(&json!({ "$and": { "a": 1 } })).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));

        let err = parse_filter(&json!({ "$or": "a" })).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn references_operator() {
        let f = parse_filter(&json!({ "_type": "post", "$references": "cat-1" })).unwrap();
        match f {
            Filter::And(list) => assert!(list.contains(&Filter::References("cat-1".into()))),
            other => panic!("expected And, got: {:?}", other),
        }

        let err = parse_filter(&json!({ "$references": 42 })).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn unknown_top_level_operator_is_rejected() {
        let err = parse_filter(&json!({ "$where": "1 == 1" })).unwrap_err();
        assert!(matches!(err, Error::InvalidOperator(_)));
    }

    #[test]
    fn operator_object_with_several_ops_becomes_and() {
        let f = parse_filter(&json!({ "views": { "$gt": 10, "$lt": 100 } })).unwrap();
        match f {
            Filter::And(filters) => {
                assert_eq!(filters.len(), 2);
                for sub in &filters {
                    assert!(matches!(as_field(sub).op, CmpOp::Gt(_) | CmpOp::Lt(_)));
                }
            }
            other => panic!("expected And, got: {:?}", other),
        }
    }

    #[test]
    fn operator_payloads_are_checked() {
        for bad in [
            json!({ "tags": { "$in": "x" } }),
            json!({ "tags": { "$nin": 1 } }),
            json!({ "tags": { "$all": {} } }),
            json!({ "flag": { "$exists": 1 } }),
            json!({ "arr": { "$size": 3.5 } }),
            json!({ "views": { "$not": 3 } }),
            json!({ "views": { "$not": { "$gt": 1, "$lt": 5 } } }),
            json!({ "status": {} }),
        ] {
            let err = parse_filter(&bad).unwrap_err();
            assert!(matches!(err, Error::InvalidFilter(_)), "{bad}");
        }
    }

    #[test]
    fn not_wraps_inner_operator() {
        let f = parse_filter(&json!({ "views": { "$not": { "$gt": 10 } } })).unwrap();
        assert_eq!(as_field(&f).op, CmpOp::Not(Box::new(CmpOp::Gt(json!(10)))));
    }

    #[test]
    fn unknown_field_operator_is_invalid_operator() {
        let err = parse_filter(&json!({ "field": { "$weird": 1 } })).unwrap_err();
        assert!(matches!(err, Error::InvalidOperator(_)));
    }

    #[test]
    fn sort_directions_must_be_unit() {
        assert!(parse_sort(&[("title".into(), 1), ("publishedAt".into(), -1)]).is_ok());
        assert!(matches!(
            parse_sort(&[("title".into(), 2)]),
            Err(Error::InvalidSort(_))
        ));
        assert!(matches!(
            parse_sort(&[(String::new(), 1)]),
            Err(Error::InvalidSort(_))
        ));
    }
}
