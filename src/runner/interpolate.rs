//! `${var}` expansion in settings values
//!
//! Replaces `${VAR}` references with environment variable values.

use crate::error::{InterpolationError, InterpolationResult};
use regex::{Captures, Regex};
use std::env;
use std::sync::OnceLock;

/// Maximum number of expansion passes before giving up on nested references
const MAX_DEPTH: usize = 16;

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.-]*)\}").expect("valid regex"))
}

/// Interpolate environment variables in a string
///
/// Unknown variables are left in place. Values may themselves contain
/// references, which are expanded up to a fixed depth.
pub fn interpolate(s: &str) -> InterpolationResult<String> {
    let re = variable_pattern();
    let mut result = s.to_string();

    for _ in 0..MAX_DEPTH {
        let mut changed = false;
        let next = re
            .replace_all(&result, |caps: &Captures| match env::var(&caps[1]) {
                Ok(value) => {
                    changed = true;
                    value
                }
                Err(_) => caps[0].to_string(),
            })
            .into_owned();

        if !changed {
            return Ok(next);
        }
        result = next;
    }

    Err(InterpolationError::RecursiveInterpolation)
}

/// Like [`interpolate`], but a reference left unresolved is an error
pub fn interpolate_strict(s: &str) -> InterpolationResult<String> {
    let result = interpolate(s)?;

    if let Some(caps) = variable_pattern().captures(&result) {
        return Err(InterpolationError::UndefinedVariable(caps[1].to_string()));
    }

    Ok(result)
}
