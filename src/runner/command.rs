//! External command execution
//!
//! Every target action ends up here: a program plus an argument vector, run
//! synchronously with inherited stdio. Failure means a non-zero exit status.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::RunContext;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::Duration;

/// Placeholder printed in place of secret values
pub const MASK: &str = "***";

/// A fully assembled invocation of an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Secret argument index -> length of the prefix that may be shown
    secrets: BTreeMap<usize, usize>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ToolCommand {
            program: program.into(),
            args: Vec::new(),
            secrets: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag value`
    pub fn option(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Append `flag value`, printing the value as [`MASK`]
    pub fn secret_option(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).secret_arg("", value)
    }

    /// Append `prefix` immediately followed by a secret value, e.g.
    /// `/d:sonar.login=` and a token. Only the prefix is ever printed.
    pub fn secret_arg(mut self, prefix: &str, value: impl Into<String>) -> Self {
        self.secrets.insert(self.args.len(), prefix.len());
        self.args.push(format!("{}{}", prefix, value.into()));
        self
    }

    /// Append an MSBuild property as `/p:Name=Value`
    pub fn property(self, name: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("/p:{}={}", name, value))
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if let Some(&shown) = self.secrets.get(&i) {
                write!(f, " {}{}", &arg[..shown], MASK)?;
            } else if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Run a tool in the given context
pub fn execute_tool(cmd: &ToolCommand, ctx: &RunContext) -> ExecutionResult<()> {
    ctx.print_command(&cmd.to_string());

    if ctx.dry_run {
        return Ok(());
    }

    let mut command = StdCommand::new(&cmd.program);
    command.args(&cmd.args);
    command.current_dir(&ctx.root);

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command.status().map_err(|e| ExecutionError::Spawn {
        program: cmd.program.clone(),
        error: e.to_string(),
    })?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed {
            command: cmd.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

/// Run a tool, retrying up to `retries` more times when it exits non-zero.
///
/// A tool that cannot be started is not retried.
pub fn execute_with_retry(
    cmd: &ToolCommand,
    ctx: &RunContext,
    retries: u32,
    delay: Duration,
) -> ExecutionResult<()> {
    let mut attempt = 0;
    loop {
        match execute_tool(cmd, ctx) {
            Err(e @ ExecutionError::CommandFailed { .. }) if attempt < retries => {
                attempt += 1;
                ctx.print_warning(&format!("{} (retry {}/{})", e, attempt, retries));
                if !delay.is_zero() {
                    thread::sleep(delay * attempt);
                }
            }
            result => return result,
        }
    }
}

/// Run a program quietly and return its trimmed stdout when it succeeds
pub fn capture_stdout(program: &str, args: &[&str], dir: &Path) -> Option<String> {
    let output = StdCommand::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
