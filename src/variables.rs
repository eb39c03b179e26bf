//! `${NAME}` placeholder handling.
//!
//! Validation covers the whole script up front so a run never starts when any
//! step, reached or not, references an undefined variable. Names match the
//! configuration case-insensitively; values are inserted verbatim.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::Config;
use crate::error::{GepettoError, Result};
use crate::task::Task;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Every placeholder name referenced in `text`
pub fn collect_placeholders(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Placeholder names referenced anywhere in the task's steps
pub fn task_placeholders(task: &Task) -> BTreeSet<String> {
    task.steps.iter().flat_map(|step| collect_placeholders(step)).collect()
}

/// Fail with `MissingVariable` if any step references an undefined variable.
///
/// Names are checked in sorted order, so the reported name is deterministic.
pub fn validate_all_defined(task: &Task, config: &Config) -> Result<()> {
    let required = task_placeholders(task);

    if let Some(missing) = required.iter().find(|name| config.variable(name).is_none()) {
        return Err(GepettoError::MissingVariable(missing.clone()));
    }

    log::info!("All required variables are defined: {:?}", required);
    Ok(())
}

/// Substitute every placeholder in `text` with its configured value
pub fn resolve(text: &str, config: &Config) -> Result<String> {
    let mut missing = None;

    let resolved = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| match config.variable(&caps[1]) {
        Some(value) => value.to_string(),
        None => {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        }
    });

    match missing {
        Some(name) => Err(GepettoError::MissingVariable(name)),
        None => Ok(resolved.into_owned()),
    }
}
