//! Cleanup configuration structure and loader

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, INCLUDE_BUILTIN_CATALOG, LOCAL_CONFIG_FILE, RUN_CONDITIONAL,
};
use crate::cleanup::Clock;
use crate::types::parse_time;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    pub engine: EngineConfig,
    pub catalog: CatalogConfig,
}

/// Guard compilation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// When false, only rules flagged `unconditional` are compiled.
    pub run_conditional: bool,
    /// Fixed instant that open-ended windows close at. Unset means the wall
    /// clock at evaluation, which makes reprocessing results drift over time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_cutoff: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_conditional: RUN_CONDITIONAL,
            evaluation_cutoff: None,
        }
    }
}

/// Which rule catalogs make up the process catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub include_builtin: bool,
    /// Extra catalog files, appended after the built-in rules in this order.
    /// Relative paths resolve against the config file's directory.
    pub extra_paths: Vec<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            include_builtin: INCLUDE_BUILTIN_CATALOG,
            extra_paths: Vec::new(),
        }
    }
}

impl CleanupConfig {
    /// Load using the standard search order, falling back to defaults.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded cleanup config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        // 2. Check ./cleanup_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded cleanup config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No cleanup config found, using built-in defaults");
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for extra in &mut self.catalog.extra_paths {
            if extra.is_relative() {
                *extra = base.join(&*extra);
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if let Some(cutoff) = &self.engine.evaluation_cutoff {
            if let Err(e) = parse_time(cutoff) {
                errors.push(format!("engine.evaluation_cutoff: {e}"));
            }
        }

        for (i, path) in self.catalog.extra_paths.iter().enumerate() {
            if path.as_os_str().is_empty() {
                errors.push(format!("catalog.extra_paths[{i}] is empty"));
            }
        }

        if !self.catalog.include_builtin && self.catalog.extra_paths.is_empty() {
            warn!("Built-in catalog disabled and no extra catalogs configured; no corrections will run");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Evaluation clock for open-ended rules.
    pub fn clock(&self) -> Result<Clock, ConfigError> {
        match &self.engine.evaluation_cutoff {
            Some(cutoff) => parse_time(cutoff)
                .map(Clock::Fixed)
                .map_err(|e| ConfigError::Validation(vec![format!("engine.evaluation_cutoff: {e}")])),
            None => Ok(Clock::System),
        }
    }

    pub fn only_unconditional(&self) -> bool {
        !self.engine.run_conditional
    }
}
