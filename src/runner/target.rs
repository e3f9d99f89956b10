//! Target definitions
//!
//! A target is a named unit of work with dependency edges, ordering hints,
//! guards and an optional action. Targets are built with a fluent builder
//! and registered explicitly in a [`TargetRegistry`](crate::runner::TargetRegistry).

use crate::error::ExecutionResult;
use crate::runner::{Guard, RunContext};
use std::fmt;

/// A target's side-effecting work
pub type Action = Box<dyn Fn(&RunContext) -> ExecutionResult<()>>;

pub struct Target {
    pub name: String,

    pub description: Option<String>,

    /// Targets that must run first, in declaration order
    pub depends_on: Vec<String>,

    /// Targets this one runs before, when both are planned
    pub before: Vec<String>,

    /// Targets this one runs after, when both are planned
    pub after: Vec<String>,

    /// Checked before anything runs; an unmet requirement aborts the run
    pub requires: Vec<Guard>,

    /// Checked when the target's turn comes; unmet means skipped
    pub only_when: Vec<Guard>,

    /// Hidden from listings and help
    pub unlisted: bool,

    action: Option<Action>,
}

impl Target {
    pub fn new(name: &str) -> Self {
        Target {
            name: name.to_string(),
            description: None,
            depends_on: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            requires: Vec::new(),
            only_when: Vec::new(),
            unlisted: false,
            action: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn depends_on(mut self, targets: &[&str]) -> Self {
        self.depends_on.extend(targets.iter().map(|t| t.to_string()));
        self
    }

    pub fn before(mut self, targets: &[&str]) -> Self {
        self.before.extend(targets.iter().map(|t| t.to_string()));
        self
    }

    pub fn after(mut self, targets: &[&str]) -> Self {
        self.after.extend(targets.iter().map(|t| t.to_string()));
        self
    }

    pub fn requires(mut self, guard: Guard) -> Self {
        self.requires.push(guard);
        self
    }

    pub fn only_when(mut self, guard: Guard) -> Self {
        self.only_when.push(guard);
        self
    }

    pub fn unlisted(mut self) -> Self {
        self.unlisted = true;
        self
    }

    pub fn executes<F>(mut self, action: F) -> Self
    where
        F: Fn(&RunContext) -> ExecutionResult<()> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Run the action; targets without one succeed immediately
    pub fn run(&self, ctx: &RunContext) -> ExecutionResult<()> {
        match &self.action {
            Some(action) => action(ctx),
            None => Ok(()),
        }
    }

    /// Every target name this one refers to
    pub fn references(&self) -> impl Iterator<Item = &String> {
        self.depends_on
            .iter()
            .chain(self.before.iter())
            .chain(self.after.iter())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("requires", &self.requires)
            .field("only_when", &self.only_when)
            .field("unlisted", &self.unlisted)
            .field("has_action", &self.has_action())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use std::path::PathBuf;

    #[test]
    fn test_builder() {
        let target = Target::new("SonarEnd")
            .after(&["Test"])
            .depends_on(&["SonarBegin"])
            .requires(Guard::parameter_set("sonar-key"))
            .unlisted();

        assert_eq!(target.depends_on, vec!["SonarBegin"]);
        assert_eq!(target.after, vec!["Test"]);
        assert_eq!(target.requires.len(), 1);
        assert!(target.unlisted);
        assert!(!target.has_action());
        assert_eq!(
            target.references().cloned().collect::<Vec<_>>(),
            vec!["SonarBegin", "Test"]
        );
    }

    #[test]
    fn test_run_without_action() {
        let ctx = RunContext::new(PathBuf::from("."));
        assert!(Target::new("CI").run(&ctx).is_ok());
    }

    #[test]
    fn test_run_action_error() {
        let ctx = RunContext::new(PathBuf::from("."));
        let target = Target::new("Pack")
            .executes(|_| Err(ExecutionError::NoMatch("*.nupkg".to_string())));

        assert!(matches!(target.run(&ctx), Err(ExecutionError::NoMatch(_))));
    }
}
