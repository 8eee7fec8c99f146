use serde::Serialize;
use serde_json::Value as Json;

/// Comparison operations on a single field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CmpOp {
    Eq(Json),
    Ne(Json),
    Gt(Json),
    Gte(Json),
    Lt(Json),
    Lte(Json),
    In(Vec<Json>),
    Nin(Vec<Json>),
    All(Vec<Json>),
    Exists(bool),
    Size(i64),
    Not(Box<CmpOp>),
}

/// A single field expression: `<path> <op>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldExpr {
    pub path: String, // e.g. "_type", "slug.current"
    pub op: CmpOp,
}

/// Filter tree:
/// - Field(expr)
/// - References(id): some `{ "_ref": id }` appears anywhere in the document
/// - And([...])
/// - Or([...])
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Field(FieldExpr),
    References(String),
}

impl Filter {
    pub fn field(path: impl Into<String>, op: CmpOp) -> Self {
        Filter::Field(FieldExpr {
            path: path.into(),
            op,
        })
    }

    /// Matches every document.
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }
}
