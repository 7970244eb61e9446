//! Attribute to column mapping
//!
//! A `MappingTable` binds SCIM attribute paths to backing-store columns for
//! one resource type. Column names come from trusted configuration only and
//! are written into predicate text verbatim.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::types::AttributePath;

/// Declared column type, drives compare value coercion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Int64,
    Bool,
    #[default]
    String,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Bool => write!(f, "bool"),
            DataType::String => write!(f, "string"),
        }
    }
}

/// Backing-store binding for one attribute path
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnMapping {
    pub column: String,
    #[serde(rename = "type", default)]
    pub data_type: DataType,
    #[serde(default)]
    pub sortable: bool,
}

impl ColumnMapping {
    pub fn new(column: impl Into<String>, data_type: DataType, sortable: bool) -> Self {
        Self {
            column: column.into(),
            data_type,
            sortable,
        }
    }
}

/// Attribute path → column mapping for one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: HashMap<AttributePath, ColumnMapping>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. Schema URIs on the key are ignored.
    pub fn with(mut self, path: AttributePath, mapping: ColumnMapping) -> Self {
        self.insert(path, mapping);
        self
    }

    pub fn insert(&mut self, path: AttributePath, mapping: ColumnMapping) {
        self.entries.insert(path.key(), mapping);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributePath, &ColumnMapping)> {
        self.entries.iter()
    }

    /// Resolve the column for a leaf attribute.
    ///
    /// Inside a value path `parent` names the enclosing attribute and the
    /// leaf's own name acts as the sub-attribute (`emails[type eq "work"]`
    /// looks up `emails.type`). That parent-scoped key is tried first, then
    /// the leaf path itself.
    pub fn resolve(
        &self,
        path: &AttributePath,
        parent: Option<&str>,
    ) -> Result<&ColumnMapping, FilterError> {
        let scoped = parent.and_then(|parent| {
            self.entries
                .get(&AttributePath::with_sub(parent, path.name.as_str()))
        });

        scoped
            .or_else(|| self.entries.get(&path.key()))
            .ok_or_else(|| {
                let attribute = match parent {
                    Some(parent) => format!("{}[{}]", parent, path.unqualified()),
                    None => path.unqualified(),
                };
                FilterError::unmapped_field(attribute)
            })
    }

    /// Resolve the column to order by, rejecting attributes not marked sortable
    pub fn sort_column(&self, path: &AttributePath) -> Result<&str, FilterError> {
        let mapping = self.resolve(path, None)?;
        if !mapping.sortable {
            return Err(FilterError::UnsortableField {
                attribute: path.unqualified(),
            });
        }
        Ok(&mapping.column)
    }
}

impl FromIterator<(AttributePath, ColumnMapping)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (AttributePath, ColumnMapping)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (path, mapping) in iter {
            table.insert(path, mapping);
        }
        table
    }
}
