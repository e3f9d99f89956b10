//! Console formatting
//!
//! Message prefixes, target banners and the end-of-run summary. Whether
//! anything is printed at all is decided by the caller's verbosity.

use crate::runner::{RunReport, Target, TargetStatus};
use colored::{ColoredString, Colorize};
use std::time::Duration;

const WIDTH: usize = 60;

pub fn info_prefix() -> ColoredString {
    "[INFO]".blue()
}

pub fn warn_prefix() -> ColoredString {
    "[WARN]".yellow()
}

pub fn error_prefix() -> ColoredString {
    "[ERROR]".red().bold()
}

pub fn debug_prefix() -> ColoredString {
    "[DEBUG]".dimmed()
}

pub fn run_prefix() -> ColoredString {
    "[RUN]".cyan()
}

pub fn dry_run_prefix() -> ColoredString {
    "[DRY-RUN]".magenta()
}

pub fn skip_prefix() -> ColoredString {
    "[SKIP]".yellow()
}

/// Banner printed when a target starts
pub fn target_banner(name: &str) -> String {
    let rule = "═".repeat(WIDTH);
    format!("\n{}\n{}\n{}", rule, name.bold(), rule)
}

/// Format a duration as `m:ss`, or `< 1sec` for short ones
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        "< 1sec".to_string()
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

fn status_label(status: TargetStatus) -> ColoredString {
    match status {
        TargetStatus::Pending => "Pending".normal(),
        TargetStatus::Skipped => "Skipped".yellow(),
        TargetStatus::Running => "Running".cyan(),
        TargetStatus::Succeeded => "Succeeded".green(),
        TargetStatus::Failed => "Failed".red().bold(),
        TargetStatus::NotRun => "NotRun".dimmed(),
    }
}

/// Summary table printed at the end of a run
pub fn summary_table(report: &RunReport) -> String {
    let heavy = "═".repeat(WIDTH);
    let light = "─".repeat(WIDTH);
    let mut out = String::new();

    out.push('\n');
    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!("{:<24}{:<14}{:>22}\n", "Target", "Status", "Duration"));
    out.push_str(&light);
    out.push('\n');

    for outcome in &report.outcomes {
        // Pad by hand; escape codes would break the alignment
        let plain = format!("{:?}", outcome.status);
        let colored = format!(
            "{}{}",
            status_label(outcome.status),
            " ".repeat(14usize.saturating_sub(plain.len()))
        );
        let duration = match outcome.status {
            TargetStatus::Succeeded | TargetStatus::Failed => format_duration(outcome.duration),
            _ => String::new(),
        };
        out.push_str(&format!("{:<24}{}{:>22}", outcome.name, colored, duration));
        if let Some(reason) = &outcome.reason {
            out.push_str(&format!("  // {}", reason).dimmed().to_string());
        }
        out.push('\n');
    }

    out.push_str(&light);
    out.push('\n');
    out.push_str(&format!(
        "{:<38}{:>22}\n",
        "Total",
        format_duration(report.total_duration())
    ));
    out.push_str(&heavy);
    out.push('\n');

    if report.succeeded() {
        out.push_str(&"Build succeeded".green().bold().to_string());
    } else {
        out.push_str(&"Build failed".red().bold().to_string());
    }
    out
}

/// Listing of visible targets with their descriptions
pub fn target_list<'a>(targets: impl Iterator<Item = &'a Target>, default_target: &str) -> String {
    let mut out = String::from("Targets (with their direct dependencies):\n\n");

    for target in targets {
        let mut name = target.name.clone();
        if target.name.eq_ignore_ascii_case(default_target) {
            name.push_str(" (default)");
        }
        out.push_str(&format!("  {}", format!("{:<22}", name).bold()));
        if let Some(description) = &target.description {
            out.push_str(description);
        }
        if !target.depends_on.is_empty() {
            out.push_str(&format!(" -> {}", target.depends_on.join(", ")).dimmed().to_string());
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TargetOutcome;

    fn outcome(name: &str, status: TargetStatus, secs: u64) -> TargetOutcome {
        TargetOutcome {
            name: name.to_string(),
            status,
            duration: Duration::from_secs(secs),
            reason: None,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(300)), "< 1sec");
        assert_eq!(format_duration(Duration::from_secs(75)), "1:15");
    }

    #[test]
    fn test_summary_lists_every_target() {
        colored::control::set_override(false);
        let report = RunReport {
            outcomes: vec![
                outcome("Restore", TargetStatus::Succeeded, 3),
                outcome("Compile", TargetStatus::Failed, 65),
                outcome("Test", TargetStatus::NotRun, 0),
            ],
        };

        let table = summary_table(&report);
        assert!(table.contains("Restore"));
        assert!(table.contains("Failed"));
        assert!(table.contains("1:05"));
        assert!(table.contains("NotRun"));
        assert!(table.contains("Build failed"));
    }

    #[test]
    fn test_target_list_marks_default() {
        colored::control::set_override(false);
        let targets = vec![
            Target::new("Compile").description("Compile the solution").depends_on(&["Restore"]),
            Target::new("Test"),
        ];

        let list = target_list(targets.iter(), "test");
        assert!(list.contains("Test (default)"));
        assert!(list.contains("Compile the solution"));
        assert!(list.contains("-> Restore"));
    }
}
