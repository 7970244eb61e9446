//! Core application

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::cli::{self, Commands};
use crate::core::config::{AppConfig, ResourceConfig};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::filter::{self, CompileOptions, Expression, OrderBy, Page, SortDirection};

pub struct CoreApp {
    pub config: AppConfig,
}

/// Arguments of the `compile` command
struct CompileArgs {
    resource: String,
    filter_file: Option<PathBuf>,
    start_index: u64,
    count: Option<u64>,
    order_by: Option<String>,
    order_direction: Option<SortDirection>,
    request_id: Option<String>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
        };

        match command {
            Commands::Compile {
                resource,
                filter_file,
                start_index,
                count,
                order_by,
                order_direction,
                request_id,
            } => app.compile(CompileArgs {
                resource,
                filter_file,
                start_index,
                count,
                order_by,
                order_direction,
                request_id,
            }),
            Commands::Resources => {
                app.list_resources();
                Ok(())
            }
        }
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    fn compile(&self, args: CompileArgs) -> Result<()> {
        let resource = self.config.resource(&args.resource)?;
        let filter = read_filter(args.filter_file.as_deref())?;

        let order = resolve_order(resource, args.order_by.as_deref(), args.order_direction)
            .with_context(|| format!("Invalid ordering for resource '{}'", args.resource))?;
        let count = args
            .count
            .or(resource.count)
            .unwrap_or(self.config.default_count);
        let options = CompileOptions {
            request_id: args.request_id,
        };

        let query = filter::compile_with(
            filter.as_ref(),
            &resource.mappings,
            &order,
            Page::new(args.start_index, count),
            &options,
        )
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;

        println!("{}", serde_json::to_string_pretty(&query)?);
        Ok(())
    }

    fn list_resources(&self) {
        for (name, resource) in &self.config.resources {
            println!("{}", name);
            let mut attributes: Vec<_> = resource.mappings.iter().collect();
            attributes.sort_by_key(|(path, _)| path.to_string());
            for (path, mapping) in attributes {
                println!(
                    "  {:<24} {:<24} {:<6}{}",
                    path.to_string(),
                    mapping.column,
                    mapping.data_type.to_string(),
                    if mapping.sortable { " sortable" } else { "" }
                );
            }
        }
    }
}

/// Read the serialized filter tree from a file or stdin
fn read_filter(path: Option<&Path>) -> Result<Option<Expression>> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read filter from stdin")?;
            buf
        }
    };

    if json.trim().is_empty() {
        return Ok(None);
    }
    Expression::from_json(&json).map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))
}

/// Pick the ORDER BY column: CLI attribute, else the resource default, else
/// the first sortable mapping
fn resolve_order(
    resource: &ResourceConfig,
    attribute: Option<&str>,
    direction: Option<SortDirection>,
) -> Result<OrderBy> {
    let direction = direction.unwrap_or(resource.order_direction);
    let attribute = match attribute {
        Some(attr) => Some(attr.parse().map_err(|e: String| anyhow::anyhow!(e))?),
        None => resource.order_by.clone(),
    };

    let column = match attribute {
        Some(attr) => resource.mappings.sort_column(&attr)?.to_string(),
        None => {
            let mut sortable: Vec<_> = resource
                .mappings
                .iter()
                .filter(|(_, mapping)| mapping.sortable)
                .collect();
            sortable.sort_by_key(|(path, _)| path.to_string());
            sortable
                .first()
                .map(|(_, mapping)| mapping.column.clone())
                .context("No order_by configured and no sortable attribute mapped")?
        }
    };

    Ok(OrderBy::new(column, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AttributePath, ColumnMapping, DataType, MappingTable};
    use std::io::Write;

    fn resource() -> ResourceConfig {
        ResourceConfig {
            mappings: MappingTable::new()
                .with(
                    AttributePath::new("id"),
                    ColumnMapping::new("tra.id", DataType::Int, true),
                )
                .with(
                    AttributePath::new("created"),
                    ColumnMapping::new("tra.created_at", DataType::String, true),
                )
                .with(
                    AttributePath::new("note"),
                    ColumnMapping::new("tra.note", DataType::String, false),
                ),
            order_by: None,
            order_direction: SortDirection::Asc,
            count: None,
        }
    }

    #[test]
    fn resolve_order_from_cli_attribute() {
        let order = resolve_order(&resource(), Some("id"), Some(SortDirection::Desc)).unwrap();
        assert_eq!(order.to_sql(), "order by tra.id desc");
    }

    #[test]
    fn resolve_order_falls_back_to_first_sortable() {
        let order = resolve_order(&resource(), None, None).unwrap();
        assert_eq!(order.to_sql(), "order by tra.created_at asc");
    }

    #[test]
    fn resolve_order_uses_resource_default() {
        let mut resource = resource();
        resource.order_by = Some(AttributePath::new("id"));
        resource.order_direction = SortDirection::Desc;
        let order = resolve_order(&resource, None, None).unwrap();
        assert_eq!(order.to_sql(), "order by tra.id desc");
    }

    #[test]
    fn resolve_order_rejects_unsortable() {
        assert!(resolve_order(&resource(), Some("note"), None).is_err());
        assert!(resolve_order(&resource(), Some("missing"), None).is_err());
    }

    #[test]
    fn read_filter_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"type":"attribute","path":{"name":"id"},"operator":"pr"}"#)
            .unwrap();
        let filter = read_filter(Some(file.path())).unwrap();
        assert_eq!(filter, Some(Expression::present(AttributePath::new("id"))));
    }

    #[test]
    fn read_filter_null_means_no_filter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"null").unwrap();
        assert_eq!(read_filter(Some(file.path())).unwrap(), None);
    }

    #[test]
    fn read_filter_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = read_filter(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("INVALID_FILTER_SYNTAX"));
    }
}
