//! Pagination and ordering clauses

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Sort direction, restricted to asc/desc
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidOrderDirection(s.to_string())),
        }
    }
}

/// Requested page: SCIM `startIndex` and `count`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub start_index: u64,
    pub count: u64,
}

impl Page {
    pub fn new(start_index: u64, count: u64) -> Self {
        Self { start_index, count }
    }

    /// Rows to skip: `startIndex * count`, or 0 when no start index was given
    pub fn offset(&self) -> u64 {
        if self.start_index > 0 {
            self.start_index.saturating_mul(self.count)
        } else {
            0
        }
    }

    /// `limit <offset>, <count>`
    pub fn to_sql(&self) -> String {
        format!("limit {}, {}", self.offset(), self.count)
    }
}

/// ORDER BY column and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Build from a caller-supplied direction string, rejecting anything but asc/desc
    pub fn parse(column: impl Into<String>, direction: &str) -> Result<Self, FilterError> {
        Ok(Self::new(column, direction.parse()?))
    }

    /// `order by <column> <direction>`
    pub fn to_sql(&self) -> String {
        format!("order by {} {}", self.column, self.direction)
    }
}
