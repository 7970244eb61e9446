use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::filter::SortDirection;

use super::constants::{ENV_CONFIG, ENV_DEFAULT_COUNT, ENV_RESOURCE};

#[derive(Parser)]
#[command(name = "scimsql")]
#[command(version, about = "SCIM filter to SQL compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Page size when neither the request nor the resource sets one
    #[arg(long, global = true, env = ENV_DEFAULT_COUNT)]
    pub default_count: Option<u64>,
}

/// Parse sort direction from CLI/env string
fn parse_sort_direction(s: &str) -> Result<SortDirection, String> {
    s.parse::<SortDirection>().map_err(|e| e.to_string())
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile a parsed filter tree (JSON) into a SQL predicate
    Compile {
        /// Resource whose mapping table resolves attributes
        #[arg(long, short = 'r', env = ENV_RESOURCE)]
        resource: String,

        /// File holding the filter tree as JSON (reads stdin when omitted)
        #[arg(long, short = 'f')]
        filter_file: Option<PathBuf>,

        /// SCIM startIndex
        #[arg(long, default_value_t = 0)]
        start_index: u64,

        /// SCIM count (page size)
        #[arg(long)]
        count: Option<u64>,

        /// Attribute to order by (must be mapped and sortable)
        #[arg(long)]
        order_by: Option<String>,

        /// Order direction (asc or desc)
        #[arg(long, value_parser = parse_sort_direction)]
        order_direction: Option<SortDirection>,

        /// Request id attached to log events
        #[arg(long)]
        request_id: Option<String>,
    },
    /// List configured resources and their mapped attributes
    Resources,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub default_count: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        default_count: cli.default_count,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compile_command() {
        let cli = Cli::try_parse_from([
            "scimsql",
            "compile",
            "--resource",
            "transactions",
            "--start-index",
            "2",
            "--count",
            "20",
            "--order-direction",
            "DESC",
        ])
        .unwrap();

        match cli.command {
            Commands::Compile {
                resource,
                start_index,
                count,
                order_direction,
                filter_file,
                ..
            } => {
                assert_eq!(resource, "transactions");
                assert_eq!(start_index, 2);
                assert_eq!(count, Some(20));
                assert_eq!(order_direction, Some(SortDirection::Desc));
                assert!(filter_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_bad_direction() {
        let result = Cli::try_parse_from([
            "scimsql",
            "compile",
            "--resource",
            "transactions",
            "--order-direction",
            "up",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["scimsql", "resources", "--config", "/tmp/scimsql.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Resources));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/scimsql.json")));
    }
}
