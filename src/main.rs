//! vessel-cleanup - apply telemetry corrections to feature series
//!
//! # Usage
//!
//! ```bash
//! # Correct a series through both stages with the built-in catalog
//! vessel-cleanup apply --input series.json > cleaned.json
//!
//! # Reproducible reprocessing: close open-ended rules at a fixed instant
//! vessel-cleanup apply --input series.json --cutoff "2024-01-01 00:00"
//!
//! # Which rules would run for ship 7 in the post stage?
//! vessel-cleanup list --ship 7 --stage post
//! ```
//!
//! # Environment Variables
//!
//! - `VESSEL_CLEANUP_CONFIG`: Path to the TOML config (default: ./cleanup_config.toml)
//! - `RUST_LOG`: Logging level (default: info). Logs go to stderr.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use vessel_cleanup::catalog;
use vessel_cleanup::cleanup::CleanupRule;
use vessel_cleanup::{CleanupConfig, CleanupPass, FeatureSeries, PassStats, ShipId, Stage};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vessel-cleanup")]
#[command(about = "Apply time-bounded vessel telemetry corrections")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides VESSEL_CLEANUP_CONFIG and ./cleanup_config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Correct a feature series (JSON) and write the result as JSON
    Apply {
        /// Input series: one series object or an array of them
        #[arg(long, short)]
        input: PathBuf,

        /// Output path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "both")]
        stage: StageArg,

        #[command(flatten)]
        selection: Selection,
    },

    /// List the rules that would be compiled
    List {
        /// Only rules for this ship
        #[arg(long)]
        ship: Option<ShipId>,

        #[arg(long, value_enum, default_value = "both")]
        stage: StageArg,

        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(clap::Args, Debug)]
struct Selection {
    /// Only run rules flagged unconditional
    #[arg(long)]
    only_unconditional: bool,

    /// Fixed instant for open-ended rule windows (e.g. "2024-01-01 00:00")
    #[arg(long)]
    cutoff: Option<String>,

    /// Extra catalog file, appended after the configured catalogs (repeatable)
    #[arg(long = "catalog")]
    catalogs: Vec<PathBuf>,

    /// Leave out the built-in catalog
    #[arg(long)]
    no_builtin: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StageArg {
    Pre,
    Post,
    Both,
}

impl StageArg {
    fn stages(self) -> &'static [Stage] {
        match self {
            Self::Pre => &[Stage::PreVesselAnatomy],
            Self::Post => &[Stage::PostVesselAnatomy],
            Self::Both => &Stage::ALL,
        }
    }
}

/// Input accepted by `apply`.
#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum SeriesInput {
    Many(Vec<FeatureSeries>),
    One(FeatureSeries),
}

impl SeriesInput {
    fn series_mut(&mut self) -> &mut [FeatureSeries] {
        match self {
            Self::Many(all) => all,
            Self::One(one) => std::slice::from_mut(one),
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config from file/env/defaults with command-line overrides applied.
fn effective_config(args: &CliArgs, selection: &Selection) -> Result<CleanupConfig> {
    let mut config = match &args.config {
        Some(path) => CleanupConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CleanupConfig::load(),
    };

    if selection.only_unconditional {
        config.engine.run_conditional = false;
    }
    if let Some(cutoff) = &selection.cutoff {
        config.engine.evaluation_cutoff = Some(cutoff.clone());
    }
    if selection.no_builtin {
        config.catalog.include_builtin = false;
    }
    config.catalog.extra_paths.extend(selection.catalogs.iter().cloned());

    config.validate().context("invalid cleanup configuration")?;
    Ok(config)
}

// ============================================================================
// Commands
// ============================================================================

fn run_apply(
    config: &CleanupConfig,
    input: &Path,
    output: Option<&Path>,
    stage: StageArg,
) -> Result<()> {
    let rules = catalog::load(&config.catalog).context("loading cleanup catalog")?;
    let pass = CleanupPass::new(&rules, config.only_unconditional(), config.clock()?)
        .context("compiling cleanup catalog")?;

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let mut data: SeriesInput = serde_json::from_reader(reader)
        .with_context(|| format!("parsing feature series {}", input.display()))?;

    let mut totals = PassStats::default();
    for series in data.series_mut() {
        series.sort_by_time();
        for &s in stage.stages() {
            totals += pass.run_stage(s, series);
        }
    }

    info!(
        samples = totals.samples,
        corrections = totals.corrections,
        clean_skipped = totals.clean_skipped,
        "Cleanup pass finished"
    );

    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &data)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, &data)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn run_list(config: &CleanupConfig, ship: Option<ShipId>, stage: StageArg) -> Result<()> {
    let rules = catalog::load(&config.catalog).context("loading cleanup catalog")?;
    let only_unconditional = config.only_unconditional();

    let selected: Vec<&CleanupRule> = rules
        .iter()
        .filter(|r| ship.map_or(true, |id| r.ship_id == id))
        .filter(|r| {
            stage
                .stages()
                .iter()
                .any(|&s| r.selected_for(s, only_unconditional))
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for rule in &selected {
        writeln!(
            out,
            "{:<20} ship {:<8} {:<20} {:<40} {}{}",
            rule.issue,
            rule.ship_id,
            rule.stage.as_str(),
            rule.window.to_string(),
            if rule.unconditional { "[unconditional] " } else { "" },
            rule.comment.as_deref().unwrap_or(""),
        )?;
    }
    info!(rules = selected.len(), "Listed cleanup rules");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    match &args.command {
        SubCommand::Apply {
            input,
            output,
            stage,
            selection,
        } => {
            let config = effective_config(&args, selection)?;
            run_apply(&config, input, output.as_deref(), *stage)
        }
        SubCommand::List {
            ship,
            stage,
            selection,
        } => {
            let config = effective_config(&args, selection)?;
            run_list(&config, *ship, *stage)
        }
    }
}
