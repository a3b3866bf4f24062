//! Correction Rule Engine
//!
//! Turns a catalog of [`CleanupRule`]s into per-sample [`Guard`]s for one
//! processing stage. The feature pipeline compiles each stage once per run,
//! then invokes every guard, in catalog order, on every sample.
//!
//! ## Matching
//!
//! A guard fires when the sample belongs to the rule's ship and its time lies
//! strictly inside the rule's window. An unbounded window end resolves to the
//! guard's [`Clock`] at evaluation time.
//!
//! ## Ordering
//!
//! Guards keep catalog order. Later rules may read what earlier rules in the
//! same stage wrote (a unit fix followed by an alias of the fixed value).

pub mod transforms;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::sample::{PropertyCalc, PropertyClean, SampleRef};
use crate::types::{ShipId, Stage, TimeWindow};

/// Correction applied to a matching sample through the base capability.
pub type CalcFn = Arc<dyn Fn(&mut dyn PropertyCalc) + Send + Sync>;

/// Correction that needs the bulk-clear capability.
pub type CleanFn = Arc<dyn Fn(&mut dyn PropertyClean) + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CleanupError {
    #[error("cleanup rule #{index} for ship {ship_id} has no issue reference")]
    MissingIssue { index: usize, ship_id: ShipId },
}

// ============================================================================
// Rules
// ============================================================================

/// One authored correction: which ship, when, at which stage, and what to do.
#[derive(Clone)]
pub struct CleanupRule {
    /// Ticket(s) the correction traces back to, e.g. `"NAUT-1439"`
    pub issue: String,
    pub comment: Option<String>,
    pub ship_id: ShipId,
    pub window: TimeWindow,
    pub stage: Stage,
    /// Runs even when the pipeline only asks for unconditional corrections
    pub unconditional: bool,
    pub calc: Option<CalcFn>,
    pub clean: Option<CleanFn>,
}

impl CleanupRule {
    /// Rule with an unbounded window, no transforms, conditional.
    pub fn new(issue: impl Into<String>, ship_id: ShipId, stage: Stage) -> Self {
        Self {
            issue: issue.into(),
            comment: None,
            ship_id,
            window: TimeWindow::unbounded(),
            stage,
            unconditional: false,
            calc: None,
            clean: None,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn unconditional(mut self) -> Self {
        self.unconditional = true;
        self
    }

    pub fn calc<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn PropertyCalc) + Send + Sync + 'static,
    {
        self.calc = Some(Arc::new(f));
        self
    }

    pub fn clean<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn PropertyClean) + Send + Sync + 'static,
    {
        self.clean = Some(Arc::new(f));
        self
    }

    /// A rule must always be attributable to an issue.
    pub fn validate(&self, index: usize) -> Result<(), CleanupError> {
        if self.issue.trim().is_empty() {
            return Err(CleanupError::MissingIssue {
                index,
                ship_id: self.ship_id,
            });
        }
        Ok(())
    }

    /// Whether a build for `stage` / `only_unconditional` includes this rule.
    pub fn selected_for(&self, stage: Stage, only_unconditional: bool) -> bool {
        self.stage == stage && (self.unconditional || !only_unconditional)
    }
}

impl fmt::Debug for CleanupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupRule")
            .field("issue", &self.issue)
            .field("comment", &self.comment)
            .field("ship_id", &self.ship_id)
            .field("window", &self.window)
            .field("stage", &self.stage)
            .field("unconditional", &self.unconditional)
            .field("calc", &self.calc.is_some())
            .field("clean", &self.clean.is_some())
            .finish()
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Source of "now" for rules whose window end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall-clock time at each evaluation
    #[default]
    System,
    /// A fixed cutoff, for reproducible reprocessing
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(t) => *t,
        }
    }
}

// ============================================================================
// Guards
// ============================================================================

/// What a guard did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    OtherShip,
    OutsideWindow,
    Applied,
    /// Matched and ran the calc step, but the sample could not be bulk-cleared
    CleanSkipped,
}

impl GuardOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, Self::Applied | Self::CleanSkipped)
    }
}

/// Compiled, per-sample form of a [`CleanupRule`].
#[derive(Debug, Clone)]
pub struct Guard {
    rule: CleanupRule,
    clock: Clock,
}

impl Guard {
    pub fn rule(&self) -> &CleanupRule {
        &self.rule
    }

    pub fn issue(&self) -> &str {
        &self.rule.issue
    }

    /// Run the rule against one sample.
    pub fn apply(&self, sample: &mut SampleRef<'_>) -> GuardOutcome {
        if sample.ship_id() != self.rule.ship_id {
            return GuardOutcome::OtherShip;
        }

        let time = sample.time();
        if !self.rule.window.contains_with(time, || self.clock.now()) {
            return GuardOutcome::OutsideWindow;
        }

        debug!(
            ship_id = self.rule.ship_id,
            time = %time.to_rfc3339(),
            issue = %self.rule.issue,
            "Cleaning up sample"
        );

        if let Some(calc) = &self.rule.calc {
            calc(sample.calc());
        }

        if let Some(clean) = &self.rule.clean {
            match sample.clean() {
                Some(target) => clean(target),
                None => {
                    warn!(
                        ship_id = self.rule.ship_id,
                        time = %time.to_rfc3339(),
                        issue = %self.rule.issue,
                        "Sample does not support bulk clearing, skipping clean step"
                    );
                    return GuardOutcome::CleanSkipped;
                }
            }
        }

        GuardOutcome::Applied
    }

    /// Run the rule against a sample that only offers the base capability.
    pub fn apply_basic(&self, sample: &mut dyn PropertyCalc) -> GuardOutcome {
        self.apply(&mut SampleRef::Basic(sample))
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile the guards for `stage`, resolving unbounded ends to wall-clock now.
pub fn compile(
    catalog: &[CleanupRule],
    stage: Stage,
    only_unconditional: bool,
) -> Result<Vec<Guard>, CleanupError> {
    compile_with_clock(catalog, stage, only_unconditional, Clock::System)
}

/// Compile the guards for `stage` in catalog order.
///
/// Every rule in the catalog is checked for an issue reference before any
/// guard is built, whatever its stage; one unattributed rule fails the whole
/// build.
pub fn compile_with_clock(
    catalog: &[CleanupRule],
    stage: Stage,
    only_unconditional: bool,
    clock: Clock,
) -> Result<Vec<Guard>, CleanupError> {
    for (index, rule) in catalog.iter().enumerate() {
        rule.validate(index)?;
    }

    let guards: Vec<Guard> = catalog
        .iter()
        .filter(|rule| rule.selected_for(stage, only_unconditional))
        .map(|rule| Guard {
            rule: rule.clone(),
            clock,
        })
        .collect();

    debug!(
        stage = %stage,
        only_unconditional,
        guards = guards.len(),
        catalog = catalog.len(),
        "Compiled cleanup guards"
    );

    Ok(guards)
}
