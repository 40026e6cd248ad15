//! Replacement rules to a `ReplacementSet`
//!
//! Rules are validated and resolved once per run: environment values and
//! replacement files are read here, not while converting.

use globset::Glob;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::domain::services::{FileSelector, ReplacementSet};
use crate::domain::value_objects::{Replacement, ReplacementMatcher, ReplacementRule};
use crate::error::{MetaformError, MetaformResult};

/// Resolve `rules` against `project_root`.
///
/// Returns `None` when no rule is active for this run. `lookup` reads
/// environment variables.
pub fn build_replacements(
    rules: &[ReplacementRule],
    project_root: &Path,
    chunk_size: usize,
    lookup: impl Fn(&str) -> Option<String>,
) -> MetaformResult<Option<ReplacementSet>> {
    let mut set = ReplacementSet::new(project_root, chunk_size);
    for rule in rules {
        if !conditions_hold(rule, &lookup) {
            debug!(target_files = %rule.target_label(), "replacement gated off by replace_when_env");
            continue;
        }
        let selector = selector(rule)?;
        let matcher = matcher(rule)?;
        let replace_with = replacement_value(rule, project_root, &lookup)?;
        set.push(
            selector,
            Replacement {
                matcher,
                replace_with,
                single_file: rule.filename.clone(),
            },
        );
    }
    Ok((!set.is_empty()).then_some(set))
}

fn conditions_hold(rule: &ReplacementRule, lookup: &impl Fn(&str) -> Option<String>) -> bool {
    rule.replace_when_env
        .iter()
        .all(|condition| lookup(&condition.env).as_deref() == Some(condition.value.as_str()))
}

fn invalid(rule: &ReplacementRule, message: &str) -> MetaformError {
    MetaformError::Replacement(format!("{}: {}", rule.target_label(), message))
}

fn selector(rule: &ReplacementRule) -> MetaformResult<FileSelector> {
    match (&rule.filename, &rule.glob) {
        (Some(file), None) => Ok(FileSelector::Exact(file.clone())),
        (None, Some(glob)) => Glob::new(glob)
            .map(|g| FileSelector::Glob(g.compile_matcher()))
            .map_err(|e| invalid(rule, &format!("invalid glob: {}", e))),
        _ => Err(invalid(rule, "set exactly one of filename or glob")),
    }
}

fn matcher(rule: &ReplacementRule) -> MetaformResult<ReplacementMatcher> {
    match (&rule.string_to_replace, &rule.regex_to_replace) {
        (Some(literal), None) if !literal.is_empty() => {
            Ok(ReplacementMatcher::Literal(literal.clone()))
        }
        (Some(_), None) => Err(invalid(rule, "string_to_replace is empty")),
        (None, Some(pattern)) => Regex::new(pattern)
            .map(ReplacementMatcher::Pattern)
            .map_err(|e| invalid(rule, &format!("invalid regex: {}", e))),
        _ => Err(invalid(
            rule,
            "set exactly one of string_to_replace or regex_to_replace",
        )),
    }
}

fn replacement_value(
    rule: &ReplacementRule,
    project_root: &Path,
    lookup: &impl Fn(&str) -> Option<String>,
) -> MetaformResult<String> {
    match (&rule.replace_with_env, &rule.replace_with_file) {
        (Some(var), None) => match lookup(var) {
            Some(value) => Ok(value),
            None if rule.allow_unset_env_variable => Ok(String::new()),
            None => Err(invalid(
                rule,
                &format!("environment variable {} is not set", var),
            )),
        },
        (None, Some(file)) => {
            let path = project_root.join(file);
            std::fs::read_to_string(&path).map_err(|e| {
                invalid(rule, &format!("cannot read {}: {}", path.display(), e))
            })
        }
        _ => Err(invalid(
            rule,
            "set exactly one of replace_with_env or replace_with_file",
        )),
    }
}
