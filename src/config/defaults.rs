//! Default constants for configuration loading.

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "VESSEL_CLEANUP_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "cleanup_config.toml";

/// Conditional corrections run unless the config opts out.
pub const RUN_CONDITIONAL: bool = true;

/// The built-in catalog is included unless the config opts out.
pub const INCLUDE_BUILTIN_CATALOG: bool = true;
