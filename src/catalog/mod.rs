//! Correction catalog
//!
//! Rules are authored as data: TOML records with a ship, an optional open
//! window, a stage, and ordered lists of transform steps. The built-in
//! catalog is compiled into the binary; extra catalog files can be appended
//! at process start.
//!
//! ## Record format
//!
//! ```toml
//! [[rule]]
//! issue = "NAUT-1439"
//! comment = "Filter period of weird shaft power / shaft speed"
//! ship_id = 3
//! start = "2017-09-26 21:00"   # omitted = unbounded
//! end = "2017-10-05 01:00"     # omitted = evaluation time
//! stage = "pre-vessel-anatomy"
//! unconditional = false
//! calc = [{ kind = "set_null", labels = ["Shaft Speed", "Shaft Power"] }]
//! ```

mod steps;

pub use steps::{CalcStep, CleanStep};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cleanup::{CalcFn, CleanFn, CleanupError, CleanupRule};
use crate::config::CatalogConfig;
use crate::sample::{PropertyCalc, PropertyClean};
use crate::types::{ShipId, Stage, TimeParseError, TimeWindow};

const BUILTIN_CATALOG: &str = include_str!("builtin.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog parse error ({origin}): {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("catalog rule #{index} ({issue}): {source}")]
    InvalidTime {
        index: usize,
        issue: String,
        #[source]
        source: TimeParseError,
    },

    #[error(transparent)]
    Rule(#[from] CleanupError),
}

/// One authored catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub ship_id: ShipId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub stage: Stage,
    #[serde(default)]
    pub unconditional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calc: Vec<CalcStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clean: Vec<CleanStep>,
}

impl RuleSpec {
    /// Build the executable rule. `index` is the record's catalog position,
    /// used in error messages.
    pub fn into_rule(self, index: usize) -> Result<CleanupRule, CatalogError> {
        let window = TimeWindow::parse(self.start.as_deref(), self.end.as_deref()).map_err(
            |source| CatalogError::InvalidTime {
                index,
                issue: self.issue.clone(),
                source,
            },
        )?;

        let rule = CleanupRule {
            issue: self.issue,
            comment: self.comment,
            ship_id: self.ship_id,
            window,
            stage: self.stage,
            unconditional: self.unconditional,
            calc: chain_calc(self.calc),
            clean: chain_clean(self.clean),
        };
        rule.validate(index)?;
        Ok(rule)
    }
}

fn chain_calc(steps: Vec<CalcStep>) -> Option<CalcFn> {
    let mut fns: Vec<CalcFn> = steps.into_iter().map(CalcStep::into_fn).collect();
    match fns.len() {
        0 => None,
        1 => fns.pop(),
        _ => Some(Arc::new(move |pc: &mut dyn PropertyCalc| {
            for f in &fns {
                f(&mut *pc);
            }
        })),
    }
}

fn chain_clean(steps: Vec<CleanStep>) -> Option<CleanFn> {
    let mut fns: Vec<CleanFn> = steps.into_iter().map(CleanStep::into_fn).collect();
    match fns.len() {
        0 => None,
        1 => fns.pop(),
        _ => Some(Arc::new(move |pc: &mut dyn PropertyClean| {
            for f in &fns {
                f(&mut *pc);
            }
        })),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RuleSpec>,
}

/// Parse catalog records from TOML text. `origin` names the source in errors.
pub fn parse_catalog(contents: &str, origin: &str) -> Result<Vec<RuleSpec>, CatalogError> {
    let file: CatalogFile = toml::from_str(contents).map_err(|source| CatalogError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    Ok(file.rules)
}

pub fn load_catalog_file(path: &Path) -> Result<Vec<RuleSpec>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&contents, &path.display().to_string())
}

/// Records of the catalog shipped with the crate.
pub fn builtin_specs() -> Result<Vec<RuleSpec>, CatalogError> {
    parse_catalog(BUILTIN_CATALOG, "builtin")
}

/// Turn records into rules, preserving order.
pub fn build_rules(specs: Vec<RuleSpec>) -> Result<Vec<CleanupRule>, CatalogError> {
    specs
        .into_iter()
        .enumerate()
        .map(|(index, spec)| spec.into_rule(index))
        .collect()
}

pub fn builtin() -> Result<Vec<CleanupRule>, CatalogError> {
    build_rules(builtin_specs()?)
}

/// Assemble the process catalog: built-in records (unless disabled) followed
/// by each extra file in order.
pub fn load(config: &CatalogConfig) -> Result<Vec<CleanupRule>, CatalogError> {
    let mut specs = if config.include_builtin {
        builtin_specs()?
    } else {
        Vec::new()
    };

    for path in &config.extra_paths {
        let extra = load_catalog_file(path)?;
        info!(path = %path.display(), rules = extra.len(), "Loaded extra cleanup catalog");
        specs.extend(extra);
    }

    let rules = build_rules(specs)?;
    info!(
        rules = rules.len(),
        builtin = config.include_builtin,
        "Cleanup catalog ready"
    );
    Ok(rules)
}
