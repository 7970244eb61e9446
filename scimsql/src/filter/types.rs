//! Filter expression tree
//!
//! The tree produced by the upstream SCIM filter parser. The compiler only
//! consumes it; nothing in this crate parses filter text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// A protocol-level attribute reference, e.g. `emails` or `name.givenName`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct AttributePath {
    /// Schema URI prefix, e.g. `urn:ietf:params:scim:schemas:core:2.0:User`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_attribute: Option<String>,
}

impl AttributePath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            name: name.into(),
            sub_attribute: None,
        }
    }

    pub fn with_sub(name: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            uri: None,
            name: name.into(),
            sub_attribute: Some(sub.into()),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// `name[.sub]` without the schema URI
    pub fn unqualified(&self) -> String {
        match &self.sub_attribute {
            Some(sub) => format!("{}.{}", self.name, sub),
            None => self.name.clone(),
        }
    }

    /// Same path with the schema URI dropped (mapping tables are keyed this way)
    pub(crate) fn key(&self) -> AttributePath {
        AttributePath {
            uri: None,
            name: self.name.clone(),
            sub_attribute: self.sub_attribute.clone(),
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(uri) = &self.uri {
            write!(f, "{}:", uri)?;
        }
        write!(f, "{}", self.unqualified())
    }
}

impl FromStr for AttributePath {
    type Err = String;

    /// Parses `name` or `name.sub`. Schema URIs are not accepted here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, sub) = match s.split_once('.') {
            Some((name, sub)) => (name, Some(sub)),
            None => (s, None),
        };
        if name.is_empty() || sub.is_some_and(|sub| sub.is_empty() || sub.contains('.')) {
            return Err(format!(
                "Invalid attribute path '{}'. Use 'name' or 'name.sub'",
                s
            ));
        }
        Ok(Self {
            uri: None,
            name: name.to_string(),
            sub_attribute: sub.map(str::to_string),
        })
    }
}

/// Scalar compare value carried by an attribute expression
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CompareValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Null,
}

impl CompareValue {
    /// Type name used in coercion errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "decimal",
            Self::String(_) => "string",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for CompareValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for CompareValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CompareValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for CompareValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CompareValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for CompareValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// SCIM comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Pr,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Co => "co",
            CompareOp::Sw => "sw",
            CompareOp::Ew => "ew",
            CompareOp::Pr => "pr",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SCIM logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Join token as written into predicate text
    pub fn as_sql(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// `left (and|or) right`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogicalExpression {
    pub left: Box<Expression>,
    pub operator: LogicalOp,
    pub right: Box<Expression>,
}

/// `path op [value]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttributeExpression {
    pub path: AttributePath,
    pub operator: CompareOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CompareValue>,
}

/// `path[nested]`, e.g. `emails[type eq "work"]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValuePath {
    pub path: AttributePath,
    pub filter: Box<Expression>,
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    Logical(LogicalExpression),
    Attribute(AttributeExpression),
    ValuePath(ValuePath),
    /// `not (expr)`. Representable, never compiled.
    Not { expression: Box<Expression> },
}

impl Expression {
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::logical(left, LogicalOp::And, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::logical(left, LogicalOp::Or, right)
    }

    pub fn logical(left: Expression, operator: LogicalOp, right: Expression) -> Self {
        Self::Logical(LogicalExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn compare(
        path: AttributePath,
        operator: CompareOp,
        value: impl Into<CompareValue>,
    ) -> Self {
        Self::Attribute(AttributeExpression {
            path,
            operator,
            value: Some(value.into()),
        })
    }

    pub fn present(path: AttributePath) -> Self {
        Self::Attribute(AttributeExpression {
            path,
            operator: CompareOp::Pr,
            value: None,
        })
    }

    pub fn value_path(path: AttributePath, filter: Expression) -> Self {
        Self::ValuePath(ValuePath {
            path,
            filter: Box::new(filter),
        })
    }

    pub fn not(expression: Expression) -> Self {
        Self::Not {
            expression: Box::new(expression),
        }
    }

    /// Node kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Logical(_) => "logical",
            Self::Attribute(_) => "attribute",
            Self::ValuePath(_) => "value_path",
            Self::Not { .. } => "not",
        }
    }

    /// Deserialize a tree handed over by the upstream parser as JSON.
    /// `null` means no filter was requested.
    pub fn from_json(json: &str) -> Result<Option<Self>, FilterError> {
        serde_json::from_str(json).map_err(|e| FilterError::upstream_parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attribute_path_display() {
        assert_eq!(AttributePath::new("emails").to_string(), "emails");
        assert_eq!(
            AttributePath::with_sub("name", "givenName").to_string(),
            "name.givenName"
        );
        let qualified =
            AttributePath::new("emails").with_uri("urn:ietf:params:scim:schemas:core:2.0:User");
        assert_eq!(
            qualified.to_string(),
            "urn:ietf:params:scim:schemas:core:2.0:User:emails"
        );
        assert_eq!(qualified.unqualified(), "emails");
    }

    #[test]
    fn attribute_path_from_str() {
        assert_eq!(
            "emails".parse::<AttributePath>().unwrap(),
            AttributePath::new("emails")
        );
        assert_eq!(
            "emails.type".parse::<AttributePath>().unwrap(),
            AttributePath::with_sub("emails", "type")
        );
        assert!("".parse::<AttributePath>().is_err());
        assert!("emails.".parse::<AttributePath>().is_err());
        assert!("a.b.c".parse::<AttributePath>().is_err());
    }

    #[test]
    fn compare_value_string_form() {
        assert_eq!(CompareValue::from("example.org").to_string(), "example.org");
        assert_eq!(CompareValue::Int(300).to_string(), "300");
        assert_eq!(CompareValue::Bool(true).to_string(), "true");
        assert_eq!(CompareValue::Null.to_string(), "null");
    }

    #[test]
    fn expression_from_json() {
        let json = json!({
            "type": "logical",
            "operator": "and",
            "left": { "type": "attribute", "path": { "name": "id" }, "operator": "pr" },
            "right": {
                "type": "value_path",
                "path": { "name": "emails" },
                "filter": {
                    "type": "attribute",
                    "path": { "name": "type" },
                    "operator": "eq",
                    "value": "work"
                }
            }
        });
        let expr = Expression::from_json(&json.to_string()).unwrap().unwrap();
        assert_eq!(
            expr,
            Expression::and(
                Expression::present(AttributePath::new("id")),
                Expression::value_path(
                    AttributePath::new("emails"),
                    Expression::compare(AttributePath::new("type"), CompareOp::Eq, "work"),
                ),
            )
        );
    }

    #[test]
    fn expression_from_json_scalar_kinds() {
        let json = r#"{"type":"attribute","path":{"name":"cost"},"operator":"ge","value":4}"#;
        let expr = Expression::from_json(json).unwrap().unwrap();
        assert_eq!(
            expr,
            Expression::compare(AttributePath::new("cost"), CompareOp::Ge, 4i64)
        );

        let json = r#"{"type":"attribute","path":{"name":"enable"},"operator":"eq","value":true}"#;
        let expr = Expression::from_json(json).unwrap().unwrap();
        assert_eq!(
            expr,
            Expression::compare(AttributePath::new("enable"), CompareOp::Eq, true)
        );
    }

    #[test]
    fn expression_from_json_null_is_no_filter() {
        assert_eq!(Expression::from_json("null").unwrap(), None);
    }

    #[test]
    fn expression_from_json_rejects_garbage() {
        let err = Expression::from_json(r#"{"type":"bogus"}"#).unwrap_err();
        assert!(matches!(err, FilterError::UpstreamParse { .. }));
    }
}
