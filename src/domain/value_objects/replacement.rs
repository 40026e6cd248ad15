//! Replacement rule value objects
//!
//! [`ReplacementRule`] is the user-facing rule as written in `metaform.toml`.
//! [`Replacement`] is one resolved substitution attached to a concrete file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Condition gating a rule on an environment variable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvCondition {
    pub env: String,
    pub value: String,
}

/// A `[[replacements]]` entry
///
/// Exactly one of `filename`/`glob`, one of `string_to_replace`/`regex_to_replace`
/// and one of `replace_with_env`/`replace_with_file` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacementRule {
    /// Single file, relative to the project root
    #[serde(default)]
    pub filename: Option<PathBuf>,
    /// Glob over paths relative to the project root
    #[serde(default)]
    pub glob: Option<String>,
    #[serde(default)]
    pub string_to_replace: Option<String>,
    #[serde(default)]
    pub regex_to_replace: Option<String>,
    #[serde(default)]
    pub replace_with_env: Option<String>,
    #[serde(default)]
    pub replace_with_file: Option<PathBuf>,
    #[serde(default)]
    pub replace_when_env: Vec<EnvCondition>,
    #[serde(default)]
    pub allow_unset_env_variable: bool,
}

impl ReplacementRule {
    /// Human readable label used in reports
    pub fn target_label(&self) -> String {
        match (&self.filename, &self.glob) {
            (Some(file), _) => file.display().to_string(),
            (None, Some(glob)) => glob.clone(),
            (None, None) => "<unset>".to_string(),
        }
    }
}

/// What a replacement looks for
#[derive(Debug, Clone)]
pub enum ReplacementMatcher {
    Literal(String),
    Pattern(Regex),
}

impl ReplacementMatcher {
    pub fn is_literal(&self) -> bool {
        matches!(self, ReplacementMatcher::Literal(_))
    }

    /// Label used to report which rule fired
    pub fn source(&self) -> &str {
        match self {
            ReplacementMatcher::Literal(s) => s,
            ReplacementMatcher::Pattern(re) => re.as_str(),
        }
    }
}

impl PartialEq for ReplacementMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// A resolved substitution for a single file
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub matcher: ReplacementMatcher,
    pub replace_with: String,
    /// Set when the originating rule named a single file
    pub single_file: Option<PathBuf>,
}

impl Replacement {
    pub fn literal(find: impl Into<String>, replace_with: impl Into<String>) -> Self {
        Self {
            matcher: ReplacementMatcher::Literal(find.into()),
            replace_with: replace_with.into(),
            single_file: None,
        }
    }
}
