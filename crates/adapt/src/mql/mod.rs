//! Mongo-style queries over JSON documents.
//!
//! Filters are parsed into a small AST after `$name` parameters have been
//! bound, then evaluated document by document. Reference fields listed in a
//! query's `expand` are replaced by the documents they point at before
//! sorting, so sort keys such as `author.name` see the dereferenced value.

pub mod ast;
pub mod bind;
pub mod eval;
pub mod parser;
pub mod query;

pub use ast::{CmpOp, FieldExpr, Filter};
pub use bind::bind_params;
pub use eval::{eval_filter, field_value};
pub use parser::parse_filter;
pub use query::execute;
