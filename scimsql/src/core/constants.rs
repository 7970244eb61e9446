// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "scimsql";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".scimsql";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "scimsql.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SCIMSQL_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SCIMSQL_LOG";

// =============================================================================
// Environment Variables - Compile
// =============================================================================

/// Environment variable for the resource to compile against
pub const ENV_RESOURCE: &str = "SCIMSQL_RESOURCE";

/// Environment variable for the default page size
pub const ENV_DEFAULT_COUNT: &str = "SCIMSQL_DEFAULT_COUNT";

// =============================================================================
// Pagination Defaults
// =============================================================================

/// Page size used when neither the request nor the resource sets one
pub const DEFAULT_COUNT: u64 = 50;

/// Largest page size a config may declare
pub const MAX_COUNT: u64 = 10_000;
