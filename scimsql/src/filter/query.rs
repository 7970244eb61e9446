//! Compiled query package and the top-level entry point

use serde::{Deserialize, Serialize};

use super::builder::CompilationContext;
use super::error::FilterError;
use super::mapping::MappingTable;
use super::pagination::{OrderBy, Page};
use super::params::{SqlParams, SqlValue};
use super::types::Expression;

/// SCIM list request parameters
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default)]
    pub filter: Option<Expression>,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub count: u64,
}

impl ListRequest {
    pub fn page(&self) -> Page {
        Page::new(self.start_index, self.count)
    }
}

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Tags the log events of this compilation
    pub request_id: Option<String>,
}

/// Output of a compilation: WHERE fragment, its parameters, LIMIT and ORDER BY
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    predicate: String,
    parameters: SqlParams,
    limit: String,
    order_by: String,
}

impl CompiledQuery {
    /// Predicate text with `?` placeholders; empty when no filter was requested
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Bound values, aligned left-to-right with the placeholders
    pub fn parameters(&self) -> &[SqlValue] {
        self.parameters.as_slice()
    }

    pub fn limit(&self) -> &str {
        &self.limit
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn has_filter(&self) -> bool {
        !self.predicate.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>, String, String) {
        (
            self.predicate,
            self.parameters.into_vec(),
            self.limit,
            self.order_by,
        )
    }
}

/// Compile a list request against a resource's mapping table
pub fn compile(
    request: &ListRequest,
    mappings: &MappingTable,
    order_field: &str,
    order_direction: &str,
) -> Result<CompiledQuery, FilterError> {
    compile_with(
        request.filter.as_ref(),
        mappings,
        &OrderBy::parse(order_field, order_direction)?,
        request.page(),
        &CompileOptions::default(),
    )
}

/// Compile with an already validated ordering and explicit options.
///
/// A missing filter is not an error: the result has an empty predicate and
/// no parameters. On error nothing of the partial predicate is returned.
pub fn compile_with(
    filter: Option<&Expression>,
    mappings: &MappingTable,
    order: &OrderBy,
    page: Page,
    options: &CompileOptions,
) -> Result<CompiledQuery, FilterError> {
    let request_id = options.request_id.as_deref();
    let limit = page.to_sql();
    let order_by = order.to_sql();

    let Some(filter) = filter else {
        tracing::debug!(
            request_id = request_id.unwrap_or_default(),
            "No filter requested"
        );
        return Ok(CompiledQuery {
            predicate: String::new(),
            parameters: SqlParams::default(),
            limit,
            order_by,
        });
    };

    tracing::debug!(
        request_id = request_id.unwrap_or_default(),
        root = filter.kind(),
        mappings = mappings.len(),
        "Compiling filter"
    );

    let mut ctx = CompilationContext::new(mappings, request_id);
    ctx.compile(filter)?;
    let (predicate, parameters) = ctx.finish();

    tracing::debug!(
        request_id = request_id.unwrap_or_default(),
        params = parameters.len(),
        "Filter compiled"
    );

    Ok(CompiledQuery {
        predicate,
        parameters,
        limit,
        order_by,
    })
}
