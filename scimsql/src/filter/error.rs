//! Filter compilation errors

use thiserror::Error;

use super::mapping::DataType;
use super::types::CompareOp;

/// Error raised while compiling a filter expression into a query.
///
/// Every variant stems from the caller's input, so none of them is worth
/// retrying. The first one hit ends the compilation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Attribute has no entry in the mapping table
    #[error("Invalid/unmapped field supplied: {attribute}")]
    UnmappedField { attribute: String },

    /// Tree contains a node kind the compiler does not handle
    #[error("Unsupported filter node: {kind}")]
    UnsupportedFilterNode { kind: &'static str },

    /// Compare value disagrees with the column's declared type
    #[error("Cannot bind {actual} value '{value}' to {attribute} (declared {declared})")]
    TypeCoercion {
        attribute: String,
        declared: DataType,
        actual: &'static str,
        value: String,
    },

    /// Operator requires a compare value but none was given
    #[error("Operator '{operator}' on {attribute} requires a compare value")]
    MissingCompareValue {
        attribute: String,
        operator: CompareOp,
    },

    /// Order direction outside asc/desc
    #[error("Invalid order direction '{0}'. Use 'asc' or 'desc'")]
    InvalidOrderDirection(String),

    /// Mapped attribute is not marked sortable
    #[error("Cannot order by: {attribute}")]
    UnsortableField { attribute: String },

    /// Propagated unchanged from the filter parser
    #[error("Filter parse error: {message}")]
    UpstreamParse { message: String },
}

impl FilterError {
    pub fn unmapped_field(attribute: impl Into<String>) -> Self {
        Self::UnmappedField {
            attribute: attribute.into(),
        }
    }

    pub fn unsupported_node(kind: &'static str) -> Self {
        Self::UnsupportedFilterNode { kind }
    }

    pub fn type_coercion(
        attribute: impl Into<String>,
        declared: DataType,
        actual: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            attribute: attribute.into(),
            declared,
            actual,
            value: value.into(),
        }
    }

    pub fn missing_value(attribute: impl Into<String>, operator: CompareOp) -> Self {
        Self::MissingCompareValue {
            attribute: attribute.into(),
            operator,
        }
    }

    pub fn upstream_parse(message: impl Into<String>) -> Self {
        Self::UpstreamParse {
            message: message.into(),
        }
    }

    /// Stable code for client-facing "bad request" responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnmappedField { .. } => "INVALID_FILTER_FIELD",
            Self::UnsupportedFilterNode { .. } => "UNSUPPORTED_FILTER",
            Self::TypeCoercion { .. } | Self::MissingCompareValue { .. } => "INVALID_FILTER_VALUE",
            Self::InvalidOrderDirection(_) | Self::UnsortableField { .. } => "INVALID_ORDER",
            Self::UpstreamParse { .. } => "INVALID_FILTER_SYNTAX",
        }
    }
}
