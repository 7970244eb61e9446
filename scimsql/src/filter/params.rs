//! Bound query parameters

use std::fmt;

use serde::Serialize;

/// A value bound to one `?` placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Int(i32),
    Int64(i64),
    Bool(bool),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Int64(n) => write!(f, "{}", n),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Float(n) => write!(f, "{}", n),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Null => f.write_str("NULL"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        SqlValue::Int(n)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int64(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SqlParams {
    values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn push(&mut self, value: impl Into<SqlValue>) {
        self.values.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<SqlValue> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut params = SqlParams::default();
        params.push("0");
        params.push(1i32);
        params.push(true);
        assert_eq!(params.len(), 3);
        assert_eq!(
            params.as_slice(),
            &[SqlValue::from("0"), SqlValue::Int(1), SqlValue::Bool(true)]
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut params = SqlParams::default();
        params.push(1i32);
        params.push("%example.org%");
        params.push(true);
        params.push(SqlValue::Null);
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"[1,"%example.org%",true,null]"#
        );
    }
}
