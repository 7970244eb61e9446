use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::filter::{AttributePath, ColumnMapping, MappingTable, SortDirection};

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_COUNT, MAX_COUNT};

/// Plain identifiers, optionally table-qualified (`tra.id`)
fn is_column_name(s: &str) -> bool {
    static RE_COLUMN: OnceLock<Regex> = OnceLock::new();
    let re = RE_COLUMN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("Invalid regex")
    });
    re.is_match(s)
}

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Resource section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ResourceFileConfig {
    /// Attribute path (`name` or `name.sub`) → column mapping
    #[serde(default)]
    pub mappings: HashMap<String, ColumnMapping>,
    pub order_by: Option<String>,
    pub order_direction: Option<SortDirection>,
    pub count: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub default_count: Option<u64>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence).
    /// Resources are replaced whole, never merged attribute by attribute.
    fn merge(&mut self, other: FileConfig) {
        if other.default_count.is_some() {
            tracing::trace!(default_count = ?other.default_count, "Merging default_count");
            self.default_count = other.default_count;
        }
        for (name, resource) in other.resources {
            tracing::trace!(resource = %name, "Merging resource");
            self.resources.insert(name, resource);
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// One queryable resource: its mapping table and list defaults
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub mappings: MappingTable,
    pub order_by: Option<AttributePath>,
    pub order_direction: SortDirection,
    pub count: Option<u64>,
}

impl ResourceConfig {
    fn from_file(name: &str, file: ResourceFileConfig) -> Result<Self> {
        let mut mappings = MappingTable::new();
        for (path, mapping) in file.mappings {
            let path: AttributePath = path
                .parse()
                .map_err(|e: String| anyhow::anyhow!("resources.{}.mappings: {}", name, e))?;
            mappings.insert(path, mapping);
        }

        let order_by = file
            .order_by
            .map(|attr| attr.parse::<AttributePath>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("resources.{}.order_by: {}", name, e))?;

        Ok(Self {
            mappings,
            order_by,
            order_direction: file.order_direction.unwrap_or_default(),
            count: file.count,
        })
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_count: u64,
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl AppConfig {
    /// Load configuration with priority (later overrides earlier):
    /// 1. Defaults
    /// 2. Profile directory config (~/.scimsql/scimsql.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(path);
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_file_config(file_config, cli)?;
        config.validate()?;

        tracing::debug!(
            resources = config.resources.len(),
            default_count = config.default_count,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn from_file_config(file_config: FileConfig, cli: &CliConfig) -> Result<Self> {
        let default_count = cli
            .default_count
            .or(file_config.default_count)
            .unwrap_or(DEFAULT_COUNT);

        let resources = file_config
            .resources
            .into_iter()
            .map(|(name, file)| {
                let resource = ResourceConfig::from_file(&name, file)?;
                Ok((name, resource))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            default_count,
            resources,
        })
    }

    /// Look up a configured resource by name
    pub fn resource(&self, name: &str) -> Result<&ResourceConfig> {
        self.resources.get(name).with_context(|| {
            let known = self.resources.keys().cloned().collect::<Vec<_>>().join(", ");
            format!("Unknown resource '{}'. Configured: [{}]", name, known)
        })
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.default_count == 0 || self.default_count > MAX_COUNT {
            anyhow::bail!(
                "Configuration error: default_count must be between 1 and {}",
                MAX_COUNT
            );
        }

        for (name, resource) in &self.resources {
            if resource.mappings.is_empty() {
                tracing::warn!(resource = %name, "Resource has no mappings, every filter will fail");
            }

            for (path, mapping) in resource.mappings.iter() {
                if !is_column_name(&mapping.column) {
                    anyhow::bail!(
                        "Configuration error: resources.{}.mappings.{}: '{}' is not a valid column name",
                        name,
                        path,
                        mapping.column
                    );
                }
            }

            if let Some(count) = resource.count
                && (count == 0 || count > MAX_COUNT)
            {
                anyhow::bail!(
                    "Configuration error: resources.{}.count must be between 1 and {}",
                    name,
                    MAX_COUNT
                );
            }

            if let Some(order_by) = &resource.order_by {
                resource
                    .mappings
                    .sort_column(order_by)
                    .with_context(|| format!("Configuration error: resources.{}.order_by", name))?;
            }
        }

        Ok(())
    }
}

/// Get the profile config path (~/.scimsql/scimsql.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` to the home directory
fn expand_path(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DataType;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "default_count": 20,
        "resources": {
            "transactions": {
                "order_by": "id",
                "order_direction": "desc",
                "count": 10,
                "mappings": {
                    "id": { "column": "tra.id", "type": "int", "sortable": true },
                    "cost": { "column": "tra.cost", "type": "int64" },
                    "emails.type": { "column": "eml.type", "type": "string" }
                }
            }
        }
    }"#;

    fn load_str(json: &str, cli: &CliConfig) -> Result<AppConfig> {
        let config = AppConfig::from_file_config(FileConfig::parse(json)?, cli)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_file_config_parse_full() {
        let config = load_str(SAMPLE, &CliConfig::default()).unwrap();
        assert_eq!(config.default_count, 20);

        let resource = config.resource("transactions").unwrap();
        assert_eq!(resource.order_by, Some(AttributePath::new("id")));
        assert_eq!(resource.order_direction, SortDirection::Desc);
        assert_eq!(resource.count, Some(10));
        assert_eq!(resource.mappings.len(), 3);

        let mapping = resource
            .mappings
            .resolve(&AttributePath::new("type"), Some("emails"))
            .unwrap();
        assert_eq!(mapping.column, "eml.type");
        let mapping = resource
            .mappings
            .resolve(&AttributePath::new("cost"), None)
            .unwrap();
        assert_eq!(mapping.data_type, DataType::Int64);
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config = load_str("{}", &CliConfig::default()).unwrap();
        assert_eq!(config.default_count, DEFAULT_COUNT);
        assert!(config.resources.is_empty());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let config = FileConfig::parse(r#"{"resorces": {}}"#).unwrap();
        assert!(config.extra.get("resorces").is_some());
    }

    #[test]
    fn test_app_config_cli_override() {
        let cli = CliConfig {
            default_count: Some(5),
            ..Default::default()
        };
        let config = load_str(SAMPLE, &cli).unwrap();
        assert_eq!(config.default_count, 5);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig::parse(SAMPLE).unwrap();
        let overlay = FileConfig::parse(
            r#"{"resources": {"users": {"mappings": {"id": {"column": "usr.id"}}}}}"#,
        )
        .unwrap();
        base.merge(overlay);

        assert_eq!(base.default_count, Some(20));
        assert_eq!(base.resources.len(), 2);
        assert!(base.resources.contains_key("users"));
    }

    #[test]
    fn test_unknown_resource() {
        let config = load_str(SAMPLE, &CliConfig::default()).unwrap();
        let err = config.resource("groups").unwrap_err();
        assert!(err.to_string().contains("transactions"));
    }

    #[test]
    fn test_validation_rejects_bad_column() {
        let json = r#"{"resources": {"t": {"mappings": {"id": {"column": "id; drop table t"}}}}}"#;
        assert!(load_str(json, &CliConfig::default()).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_attribute_key() {
        let json = r#"{"resources": {"t": {"mappings": {"a.b.c": {"column": "t.a"}}}}}"#;
        assert!(load_str(json, &CliConfig::default()).is_err());
    }

    #[test]
    fn test_validation_rejects_unsortable_order_by() {
        let json = r#"{"resources": {"t": {
            "order_by": "cost",
            "mappings": {"cost": {"column": "t.cost", "type": "int"}}
        }}}"#;
        assert!(load_str(json, &CliConfig::default()).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_count() {
        let cli = CliConfig {
            default_count: Some(0),
            ..Default::default()
        };
        assert!(load_str("{}", &cli).is_err());
    }

    #[test]
    fn test_load_from_cli_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert!(config.resources.contains_key("transactions"));
    }

    #[test]
    fn test_load_missing_cli_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/scimsql.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }
}
