//! Guard evaluation
//!
//! Guards are plain data evaluated against the run context. The same guard
//! type serves both as a requirement (fatal when false) and as a static
//! condition (the target is skipped when false).

use crate::runner::RunContext;
use std::fmt;

/// A boolean check against the run context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// A parameter has a non-empty value
    ParameterSet(String),
    /// A parameter equals a value, ignoring ASCII case
    ParameterEquals { name: String, value: String },
    /// The checkout is on one of the configured main branches
    OnMainBranch,
}

impl Guard {
    pub fn parameter_set(name: &str) -> Self {
        Guard::ParameterSet(name.to_string())
    }

    pub fn parameter_equals(name: &str, value: &str) -> Self {
        Guard::ParameterEquals {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Evaluate this guard
    pub fn evaluate(&self, ctx: &RunContext) -> bool {
        match self {
            Guard::ParameterSet(name) => ctx
                .parameters
                .get(name)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false),

            Guard::ParameterEquals { name, value } => ctx
                .parameters
                .get(name)
                .map(|v| v.eq_ignore_ascii_case(value))
                .unwrap_or(false),

            Guard::OnMainBranch => ctx.is_on_main_branch(),
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::ParameterSet(name) => write!(f, "parameter '{}'", name),
            Guard::ParameterEquals { name, value } => {
                write!(f, "parameter '{}' to be '{}'", name, value)
            }
            Guard::OnMainBranch => write!(f, "being on the main branch"),
        }
    }
}

/// Evaluate a list of guards (all must be true - AND logic).
///
/// Returns the first guard that does not hold.
pub fn first_unmet<'a>(guards: &'a [Guard], ctx: &RunContext) -> Option<&'a Guard> {
    guards.iter().find(|guard| !guard.evaluate(ctx))
}
