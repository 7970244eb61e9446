//! Operator and value translation
//!
//! Maps SCIM comparison operators to SQL operators and turns the compare
//! value into the parameter that gets bound for the placeholder.

use super::error::FilterError;
use super::mapping::{ColumnMapping, DataType};
use super::params::SqlValue;
use super::types::{AttributeExpression, CompareOp, CompareValue};

/// SQL operator for a SCIM comparison operator
pub fn sql_operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "!=",
        CompareOp::Co | CompareOp::Sw | CompareOp::Ew => "LIKE",
        CompareOp::Pr => "IS NOT NULL",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
    }
}

/// Wildcard (prefix, suffix) wrapped around the value of a pattern operator
pub fn wildcard(op: CompareOp) -> Option<(&'static str, &'static str)> {
    match op {
        CompareOp::Co => Some(("%", "%")),
        CompareOp::Sw => Some(("", "%")),
        CompareOp::Ew => Some(("%", "")),
        _ => None,
    }
}

/// Parameter to bind for a leaf, `None` for `pr`
pub fn bind_value(
    expr: &AttributeExpression,
    mapping: &ColumnMapping,
) -> Result<Option<SqlValue>, FilterError> {
    if expr.operator == CompareOp::Pr {
        return Ok(None);
    }

    let value = expr
        .value
        .as_ref()
        .ok_or_else(|| FilterError::missing_value(expr.path.unqualified(), expr.operator))?;

    if let Some((prefix, suffix)) = wildcard(expr.operator) {
        return Ok(Some(SqlValue::Text(format!("{}{}{}", prefix, value, suffix))));
    }

    coerce(&expr.path.unqualified(), mapping.data_type, value).map(Some)
}

/// Coerce a compare value to the column's declared type
fn coerce(attribute: &str, declared: DataType, value: &CompareValue) -> Result<SqlValue, FilterError> {
    let mismatch =
        || FilterError::type_coercion(attribute, declared, value.kind(), value.to_string());

    match (declared, value) {
        (DataType::Int, CompareValue::Int(n)) => {
            i32::try_from(*n).map(SqlValue::Int).map_err(|_| mismatch())
        }
        (DataType::Int64, CompareValue::Int(n)) => Ok(SqlValue::Int64(*n)),
        (DataType::Bool, CompareValue::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (DataType::Int | DataType::Int64 | DataType::Bool, _) => Err(mismatch()),
        (DataType::String, value) => Ok(passthrough(value)),
    }
}

fn passthrough(value: &CompareValue) -> SqlValue {
    match value {
        CompareValue::Bool(b) => SqlValue::Bool(*b),
        CompareValue::Int(n) => SqlValue::Int64(*n),
        CompareValue::Float(n) => SqlValue::Float(*n),
        CompareValue::String(s) => SqlValue::Text(s.clone()),
        CompareValue::Null => SqlValue::Null,
    }
}
