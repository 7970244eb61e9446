//! SCIM filter to SQL compiler
//!
//! Turns a parsed SCIM list filter (`emails co "example.org" and active eq true`)
//! into a parenthesized WHERE fragment with `?` placeholders, the ordered
//! parameters for those placeholders, and LIMIT / ORDER BY clauses.
//! Attribute names are resolved through a per-resource `MappingTable`.
//!
//! ## Usage
//!
//! ```
//! use scimsql::filter::{
//!     AttributePath, ColumnMapping, CompareOp, DataType, Expression, ListRequest, MappingTable,
//!     compile,
//! };
//!
//! let mappings = MappingTable::new().with(
//!     AttributePath::new("cost"),
//!     ColumnMapping::new("tra.cost", DataType::Int, true),
//! );
//! let request = ListRequest {
//!     filter: Some(Expression::compare(AttributePath::new("cost"), CompareOp::Eq, 300i64)),
//!     start_index: 1,
//!     count: 10,
//! };
//! let query = compile(&request, &mappings, "tra.id", "asc").unwrap();
//! assert!(query.predicate().contains("(tra.cost = ?)"));
//! assert_eq!(query.limit(), "limit 10, 10");
//! ```

mod builder;
mod error;
mod mapping;
mod operators;
mod pagination;
mod params;
mod query;
mod types;


pub use error::FilterError;
pub use mapping::{ColumnMapping, DataType, MappingTable};
pub use operators::{sql_operator, wildcard};
pub use pagination::{OrderBy, Page, SortDirection};
pub use params::{SqlParams, SqlValue};
pub use query::{CompileOptions, CompiledQuery, ListRequest, compile, compile_with};
pub use types::{
    AttributeExpression, AttributePath, CompareOp, CompareValue, Expression, LogicalExpression,
    LogicalOp, ValuePath,
};
