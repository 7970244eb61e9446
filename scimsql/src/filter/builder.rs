//! SQL predicate builder
//!
//! Walks a filter expression tree and writes a fully parenthesized WHERE
//! fragment with `?` placeholders, pushing one bound value per placeholder.
//!
//! Join tokens follow the leaf or group on their left rather than sitting
//! between operands: `a and b` renders as ` (  (a = ?) AND (b = ?)   ) `.

use super::error::FilterError;
use super::mapping::MappingTable;
use super::operators::{bind_value, sql_operator};
use super::params::SqlParams;
use super::types::{AttributeExpression, Expression, LogicalExpression, ValuePath};

/// Trailing token for leaves that are not followed by a connective
const BLANK_TOKEN: &str = " ";

/// Working state for one compilation. Never shared between calls.
pub(crate) struct CompilationContext<'a> {
    mappings: &'a MappingTable,
    request_id: Option<&'a str>,
    sql: String,
    params: SqlParams,
}

impl<'a> CompilationContext<'a> {
    pub(crate) fn new(mappings: &'a MappingTable, request_id: Option<&'a str>) -> Self {
        Self {
            mappings,
            request_id,
            sql: String::new(),
            params: SqlParams::default(),
        }
    }

    /// Compile the root node. Any error aborts the whole walk.
    pub(crate) fn compile(&mut self, expr: &Expression) -> Result<(), FilterError> {
        match expr {
            Expression::Logical(logical) => self.logical(logical, None),
            Expression::Attribute(attr) => self.attribute(attr, None, BLANK_TOKEN),
            Expression::ValuePath(value_path) => self.value_path(value_path),
            Expression::Not { .. } => Err(FilterError::unsupported_node(expr.kind())),
        }
    }

    pub(crate) fn finish(self) -> (String, SqlParams) {
        (self.sql, self.params)
    }

    fn value_path(&mut self, value_path: &ValuePath) -> Result<(), FilterError> {
        let parent = value_path.path.unqualified();
        match value_path.filter.as_ref() {
            Expression::Logical(logical) => self.logical(logical, Some(parent.as_str())),
            Expression::Attribute(attr) => self.attribute(attr, Some(parent.as_str()), BLANK_TOKEN),
            other => Err(FilterError::unsupported_node(other.kind())),
        }
    }

    fn logical(
        &mut self,
        logical: &LogicalExpression,
        parent: Option<&str>,
    ) -> Result<(), FilterError> {
        let token = logical.operator.as_sql();
        self.sql.push_str(" ( ");

        match logical.left.as_ref() {
            Expression::Attribute(attr) => self.attribute(attr, parent, token)?,
            group => {
                self.operand(group, parent)?;
                self.sql.push(' ');
                self.sql.push_str(token);
                self.sql.push(' ');
            }
        }

        match logical.right.as_ref() {
            Expression::Attribute(attr) => self.attribute(attr, parent, BLANK_TOKEN)?,
            group => self.operand(group, parent)?,
        }

        self.sql.push_str(" ) ");
        Ok(())
    }

    /// Non-leaf operand of a logical node
    fn operand(&mut self, expr: &Expression, parent: Option<&str>) -> Result<(), FilterError> {
        match expr {
            Expression::Logical(logical) => self.logical(logical, parent),
            Expression::ValuePath(value_path) if parent.is_none() => self.value_path(value_path),
            Expression::Attribute(attr) => self.attribute(attr, parent, BLANK_TOKEN),
            other => Err(FilterError::unsupported_node(other.kind())),
        }
    }

    fn attribute(
        &mut self,
        attr: &AttributeExpression,
        parent: Option<&str>,
        token: &str,
    ) -> Result<(), FilterError> {
        let mappings = self.mappings;
        let mapping = mappings.resolve(&attr.path, parent).inspect_err(|e| {
            tracing::warn!(
                request_id = self.request_id.unwrap_or_default(),
                error = %e,
                "Invalid field supplied"
            );
        })?;
        let op = sql_operator(attr.operator);
        let token = token.to_uppercase();

        match bind_value(attr, mapping)? {
            Some(value) => {
                let fragment = format!(" ({} {} ?) {}", mapping.column, op, token);
                tracing::trace!(fragment = %fragment, param = %value, "Emit comparison");
                self.sql.push_str(&fragment);
                self.params.push(value);
            }
            None => {
                let fragment = format!(" ({} {}) {}", mapping.column, op, token);
                tracing::trace!(fragment = %fragment, "Emit presence check");
                self.sql.push_str(&fragment);
            }
        }
        Ok(())
    }
}
