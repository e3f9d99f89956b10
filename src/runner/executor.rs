//! Plan execution
//!
//! Runs a plan sequentially. Requirements of every planned target are checked
//! before the first action, so a missing parameter never leaves a half-done
//! build behind. After that, the first failing action aborts the rest of the
//! plan; nothing already done is rolled back.

use crate::error::{BuildError, ConfigError, Result};
use crate::runner::{first_unmet, ExecutionPlan, Guard, RunContext, TargetRegistry, Verbosity};
use crate::ui;
use std::time::{Duration, Instant};

/// Lifecycle of a single target within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Pending,
    Skipped,
    Running,
    Succeeded,
    Failed,
    /// Never reached because an earlier target failed
    NotRun,
}

impl TargetStatus {
    /// Completed targets satisfy their dependents
    pub fn is_completed(&self) -> bool {
        matches!(self, TargetStatus::Skipped | TargetStatus::Succeeded)
    }
}

/// What happened to one target
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub name: String,
    pub status: TargetStatus,
    pub duration: Duration,
    /// Why the target was skipped
    pub reason: Option<String>,
}

/// Per-target outcomes in plan order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    pub fn status_of(&self, name: &str) -> Option<TargetStatus> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.status)
    }

    /// Names of targets whose action ran, in order
    pub fn executed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TargetStatus::Succeeded | TargetStatus::Failed))
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_completed())
    }

    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.duration).sum()
    }
}

/// Executes plans built from a registry
pub struct Executor<'a> {
    registry: &'a TargetRegistry,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a TargetRegistry) -> Self {
        Executor { registry }
    }

    /// Plan and run `requested`
    pub fn run(&self, requested: &str, ctx: &RunContext) -> Result<RunReport> {
        let plan = self.registry.plan(requested)?;
        ctx.print_debug(&format!("Plan: {}", plan.targets.join(" -> ")));
        self.execute(&plan, ctx)
    }

    /// Check requirements, then run every target of `plan` in order
    pub fn execute(&self, plan: &ExecutionPlan, ctx: &RunContext) -> Result<RunReport> {
        self.check_requirements(plan, ctx)?;

        let mut report = RunReport {
            outcomes: plan
                .targets
                .iter()
                .map(|name| TargetOutcome {
                    name: name.clone(),
                    status: TargetStatus::Pending,
                    duration: Duration::ZERO,
                    reason: None,
                })
                .collect(),
        };

        for index in 0..plan.targets.len() {
            let name = &plan.targets[index];
            let target = self
                .registry
                .get(name)
                .ok_or_else(|| ConfigError::TargetNotFound(name.clone()))?;

            if let Some(reason) = self.skip_reason(target.name.as_str(), &target.only_when, ctx) {
                ctx.print_target_skip(name, &reason);
                let outcome = &mut report.outcomes[index];
                outcome.status = TargetStatus::Skipped;
                outcome.reason = Some(reason);
                continue;
            }

            report.outcomes[index].status = TargetStatus::Running;
            ctx.print_target_start(name);

            let started = Instant::now();
            let result = target.run(ctx);
            report.outcomes[index].duration = started.elapsed();

            if let Err(source) = result {
                report.outcomes[index].status = TargetStatus::Failed;
                for outcome in &mut report.outcomes[index + 1..] {
                    outcome.status = TargetStatus::NotRun;
                }
                self.print_summary(&report, ctx);
                return Err(BuildError::TargetFailed {
                    target: name.clone(),
                    source,
                });
            }

            report.outcomes[index].status = TargetStatus::Succeeded;
        }

        self.print_summary(&report, ctx);
        Ok(report)
    }

    /// Fail on the first unmet requirement of any target that will not be
    /// skipped from the command line
    fn check_requirements(&self, plan: &ExecutionPlan, ctx: &RunContext) -> Result<()> {
        for name in &plan.targets {
            if ctx.is_skipped(name) {
                continue;
            }
            let target = self
                .registry
                .get(name)
                .ok_or_else(|| ConfigError::TargetNotFound(name.clone()))?;

            if let Some(guard) = first_unmet(&target.requires, ctx) {
                let error = match guard {
                    Guard::ParameterSet(parameter) => ConfigError::MissingParameter {
                        target: target.name.clone(),
                        parameter: parameter.clone(),
                    },
                    other => ConfigError::RequirementNotMet {
                        target: target.name.clone(),
                        requirement: other.to_string(),
                    },
                };
                return Err(error.into());
            }
        }
        Ok(())
    }

    fn skip_reason(&self, name: &str, only_when: &[Guard], ctx: &RunContext) -> Option<String> {
        if ctx.is_skipped(name) {
            return Some("skipped on the command line".to_string());
        }
        first_unmet(only_when, ctx).map(|guard| format!("requires {}", guard))
    }

    fn print_summary(&self, report: &RunReport, ctx: &RunContext) {
        if ctx.verbosity >= Verbosity::Quiet {
            eprintln!("{}", ui::summary_table(report));
        }
    }
}
