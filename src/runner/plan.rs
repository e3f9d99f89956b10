//! Target registry and execution planning
//!
//! Planning turns a requested target into an ordered list of target names:
//!
//! 1. the closure is everything reachable through `depends_on` edges;
//! 2. `before`/`after` hints add ordering edges between targets already in
//!    the closure but never pull new targets in;
//! 3. the closure is sorted topologically (Kahn), ties broken by declaration
//!    order, so the same registry always yields the same plan.

use crate::error::{ConfigError, ConfigResult};
use crate::runner::Target;
use std::collections::{BTreeSet, HashMap};

/// All targets of a build, in declaration order
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    /// Lowercased name -> declaration index
    index: HashMap<String, usize>,
}

/// An ordered list of targets to run for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Canonical name of the requested target
    pub requested: String,
    /// Target names in execution order; the requested target is last
    pub targets: Vec<String>,
}

impl ExecutionPlan {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t == name)
    }
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target. Names are unique ignoring ASCII case.
    pub fn register(&mut self, target: Target) -> ConfigResult<()> {
        let key = target.name.to_ascii_lowercase();
        if self.index.contains_key(&key) {
            return Err(ConfigError::DuplicateTarget(target.name));
        }
        self.index.insert(key, self.targets.len());
        self.targets.push(target);
        Ok(())
    }

    /// Look up a target by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.position(name).map(|i| &self.targets[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }

    /// All targets in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Targets shown in listings
    pub fn listed(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.unlisted)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Check that every dependency and ordering hint names a known target
    pub fn validate(&self) -> ConfigResult<()> {
        for target in &self.targets {
            for reference in target.references() {
                if self.position(reference).is_none() {
                    return Err(ConfigError::UnknownReference {
                        target: target.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Compute the execution plan for `requested`
    pub fn plan(&self, requested: &str) -> ConfigResult<ExecutionPlan> {
        let start = self
            .position(requested)
            .ok_or_else(|| ConfigError::TargetNotFound(requested.to_string()))?;

        let in_closure = self.closure(start)?;
        let successors = self.ordering_edges(&in_closure);
        let order = self.sort(&in_closure, &successors)?;

        Ok(ExecutionPlan {
            requested: self.targets[start].name.clone(),
            targets: order
                .into_iter()
                .map(|i| self.targets[i].name.clone())
                .collect(),
        })
    }

    /// Mark every target reachable from `start` through `depends_on`
    fn closure(&self, start: usize) -> ConfigResult<Vec<bool>> {
        let mut in_closure = vec![false; self.targets.len()];
        let mut stack = vec![start];
        in_closure[start] = true;

        while let Some(current) = stack.pop() {
            let target = &self.targets[current];
            for dependency in &target.depends_on {
                let dep = self.resolve(target, dependency)?;
                if !in_closure[dep] {
                    in_closure[dep] = true;
                    stack.push(dep);
                }
            }
        }

        Ok(in_closure)
    }

    /// Successor sets: an edge `a -> b` means `a` runs before `b`
    fn ordering_edges(&self, in_closure: &[bool]) -> Vec<BTreeSet<usize>> {
        let mut successors = vec![BTreeSet::new(); self.targets.len()];

        for (i, target) in self.targets.iter().enumerate() {
            if !in_closure[i] {
                continue;
            }
            // Hints may name targets outside the closure; those are ignored
            let planned = |name: &String| self.position(name).filter(|&j| in_closure[j]);

            for dep in target.depends_on.iter().filter_map(planned) {
                successors[dep].insert(i);
            }
            for later in target.before.iter().filter_map(planned) {
                successors[i].insert(later);
            }
            for earlier in target.after.iter().filter_map(planned) {
                successors[earlier].insert(i);
            }
        }

        successors
    }

    /// Kahn's algorithm with the ready set ordered by declaration index
    fn sort(&self, in_closure: &[bool], successors: &[BTreeSet<usize>]) -> ConfigResult<Vec<usize>> {
        let mut in_degree = vec![0usize; self.targets.len()];
        for succ in successors {
            for &s in succ {
                in_degree[s] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..self.targets.len())
            .filter(|&i| in_closure[i] && in_degree[i] == 0)
            .collect();
        let total = in_closure.iter().filter(|&&c| c).count();
        let mut order = Vec::with_capacity(total);

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &s in &successors[next] {
                in_degree[s] -= 1;
                if in_degree[s] == 0 {
                    ready.insert(s);
                }
            }
        }

        if order.len() < total {
            let remaining: Vec<bool> = (0..self.targets.len())
                .map(|i| in_closure[i] && in_degree[i] > 0)
                .collect();
            return Err(ConfigError::CircularDependency(
                self.describe_cycle(&remaining, successors),
            ));
        }

        Ok(order)
    }

    /// Find one cycle among the unsorted targets and render it as `A -> B -> A`
    fn describe_cycle(&self, remaining: &[bool], successors: &[BTreeSet<usize>]) -> String {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            OnStack,
            Done,
        }

        fn visit(
            node: usize,
            remaining: &[bool],
            successors: &[BTreeSet<usize>],
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            marks[node] = Mark::OnStack;
            stack.push(node);

            for &next in &successors[node] {
                if !remaining[next] {
                    continue;
                }
                match marks[next] {
                    Mark::OnStack => {
                        let from = stack.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle = stack[from..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Mark::New => {
                        if let Some(cycle) = visit(next, remaining, successors, marks, stack) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }

            stack.pop();
            marks[node] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::New; self.targets.len()];
        for start in (0..self.targets.len()).filter(|&i| remaining[i]) {
            if marks[start] != Mark::New {
                continue;
            }
            let mut stack = Vec::new();
            if let Some(cycle) = visit(start, remaining, successors, &mut marks, &mut stack) {
                return cycle
                    .into_iter()
                    .map(|i| self.targets[i].name.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
            }
        }

        // Unreachable when Kahn left targets unsorted; keep a usable message anyway
        (0..self.targets.len())
            .filter(|&i| remaining[i])
            .map(|i| self.targets[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve a name referenced by `target`
    fn resolve(&self, target: &Target, reference: &str) -> ConfigResult<usize> {
        self.position(reference)
            .ok_or_else(|| ConfigError::UnknownReference {
                target: target.name.clone(),
                reference: reference.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(targets: Vec<Target>) -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        for target in targets {
            registry.register(target).unwrap();
        }
        registry
    }

    #[test]
    fn test_plan_single_target() {
        let reg = registry(vec![Target::new("Restore")]);
        let plan = reg.plan("Restore").unwrap();
        assert_eq!(plan.targets, vec!["Restore"]);
        assert_eq!(plan.requested, "Restore");
    }

    #[test]
    fn test_plan_is_case_insensitive() {
        let reg = registry(vec![Target::new("Restore")]);
        assert_eq!(reg.plan("restore").unwrap().requested, "Restore");
    }

    #[test]
    fn test_unknown_target() {
        let reg = registry(vec![Target::new("Restore")]);
        let result = reg.plan("Deploy");
        assert!(matches!(result, Err(ConfigError::TargetNotFound(name)) if name == "Deploy"));
    }

    #[test]
    fn test_duplicate_target() {
        let mut reg = TargetRegistry::new();
        reg.register(Target::new("Test")).unwrap();
        let result = reg.register(Target::new("test"));
        assert!(matches!(result, Err(ConfigError::DuplicateTarget(_))));
    }

    #[test]
    fn test_dependency_chain() {
        let reg = registry(vec![
            Target::new("Test").depends_on(&["Compile"]),
            Target::new("Compile").depends_on(&["Restore"]),
            Target::new("Restore"),
        ]);
        let plan = reg.plan("Test").unwrap();
        assert_eq!(plan.targets, vec!["Restore", "Compile", "Test"]);
    }

    #[test]
    fn test_diamond_runs_shared_dependency_once() {
        let reg = registry(vec![
            Target::new("Base"),
            Target::new("Left").depends_on(&["Base"]),
            Target::new("Right").depends_on(&["Base"]),
            Target::new("Top").depends_on(&["Left", "Right"]),
        ]);
        let plan = reg.plan("Top").unwrap();
        assert_eq!(plan.targets, vec!["Base", "Left", "Right", "Top"]);
    }

    #[test]
    fn test_hints_do_not_pull_targets_in() {
        let reg = registry(vec![
            Target::new("Clean").before(&["Restore"]),
            Target::new("Restore"),
            Target::new("Compile").depends_on(&["Restore"]),
        ]);
        let plan = reg.plan("Compile").unwrap();
        assert_eq!(plan.targets, vec!["Restore", "Compile"]);
    }

    #[test]
    fn test_hints_order_targets_in_closure() {
        let reg = registry(vec![
            Target::new("Pack").after(&["Test"]),
            Target::new("Test"),
            Target::new("Late").before(&["Pack"]),
            Target::new("All").depends_on(&["Pack", "Test", "Late"]),
        ]);
        let plan = reg.plan("All").unwrap();
        assert_eq!(plan.targets, vec!["Test", "Late", "Pack", "All"]);
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        let reg = registry(vec![
            Target::new("C"),
            Target::new("A"),
            Target::new("B"),
            Target::new("All").depends_on(&["B", "A", "C"]),
        ]);
        let plan = reg.plan("All").unwrap();
        assert_eq!(plan.targets, vec!["C", "A", "B", "All"]);
    }

    #[test]
    fn test_two_cycle() {
        let reg = registry(vec![
            Target::new("A").depends_on(&["B"]),
            Target::new("B").depends_on(&["A"]),
        ]);
        let result = reg.plan("A");
        match result {
            Err(ConfigError::CircularDependency(cycle)) => {
                assert_eq!(cycle, "A -> B -> A");
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_longer_cycles() {
        for n in 2..7 {
            let targets = (0..n)
                .map(|i| {
                    let dep = format!("T{}", (i + 1) % n);
                    Target::new(&format!("T{}", i)).depends_on(&[dep.as_str()])
                })
                .collect();
            let reg = registry(targets);

            let result = reg.plan("T0");
            match result {
                Err(ConfigError::CircularDependency(cycle)) => {
                    assert_eq!(cycle.split(" -> ").count(), n + 1, "cycle: {}", cycle);
                }
                other => panic!("expected cycle for n={}, got {:?}", n, other),
            }
        }
    }

    #[test]
    fn test_self_dependency() {
        let reg = registry(vec![Target::new("A").depends_on(&["A"])]);
        assert!(matches!(
            reg.plan("A"),
            Err(ConfigError::CircularDependency(cycle)) if cycle == "A -> A"
        ));
    }

    #[test]
    fn test_cycle_through_hints() {
        let reg = registry(vec![
            Target::new("A").before(&["B"]),
            Target::new("B"),
            Target::new("C").depends_on(&["A", "B"]).before(&["A"]).after(&["B"]),
        ]);
        assert!(matches!(
            reg.plan("C"),
            Err(ConfigError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_cycle_downstream_target_not_reported() {
        let reg = registry(vec![
            Target::new("A").depends_on(&["B"]),
            Target::new("B").depends_on(&["A"]),
            Target::new("Top").depends_on(&["A"]),
        ]);
        match reg.plan("Top") {
            Err(ConfigError::CircularDependency(cycle)) => {
                assert!(!cycle.contains("Top"), "cycle: {}", cycle);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_dependency() {
        let reg = registry(vec![Target::new("Publish").depends_on(&["Pack"])]);
        assert!(matches!(
            reg.plan("Publish"),
            Err(ConfigError::UnknownReference { reference, .. }) if reference == "Pack"
        ));
        assert!(reg.validate().is_err());
    }

    #[test]
    fn test_validate_checks_hints() {
        let reg = registry(vec![Target::new("Clean").before(&["Restore"])]);
        assert!(matches!(
            reg.validate(),
            Err(ConfigError::UnknownReference { target, .. }) if target == "Clean"
        ));
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let reg = registry(vec![
            Target::new("E").depends_on(&["D", "B"]),
            Target::new("D").depends_on(&["C"]),
            Target::new("C").depends_on(&["A"]),
            Target::new("B").depends_on(&["A"]),
            Target::new("A"),
        ]);
        let plan = reg.plan("E").unwrap();
        assert_eq!(plan.len(), 5);

        for target in reg.iter() {
            let Some(pos) = plan.position(&target.name) else {
                continue;
            };
            for dep in &target.depends_on {
                assert!(plan.position(dep).unwrap() < pos, "{} before {}", dep, target.name);
            }
        }
    }
}
