use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use thiserror::Error;

/// Error type for version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid version '{input}': {source}")]
    InvalidVersion {
        input: String,
        #[source]
        source: semver::Error,
    },
    #[error("Invalid version constraint '{input}': {source}")]
    InvalidConstraint {
        input: String,
        #[source]
        source: semver::Error,
    },
}

/// Parses a `MAJOR.MINOR.PATCH` version string, with optional pre-release and build metadata.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    Version::parse(input.trim()).map_err(|source| VersionError::InvalidVersion {
        input: input.to_string(),
        source,
    })
}

/// Represents a version requirement range using semver constraints.
///
/// Accepts the usual range grammar: caret, tilde, comparators, wildcards
/// (`1.x`, `*`), hyphen ranges (`1.0.0 - 2.3.0`) and `||` unions.
/// Comparators in one set may be separated by spaces or commas. A version with
/// no operator is an exact match, so `"1.0.0"` only includes 1.0.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    /// One requirement per `||` alternative
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let alternatives = constraint
            .split("||")
            .map(|alternative| {
                VersionReq::parse(&normalize_comparators(alternative)).map_err(|source| {
                    VersionError::InvalidConstraint {
                        input: constraint.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            constraint: constraint.to_string(),
            alternatives,
        })
    }

    /// Checks if a specific `semver::Version` satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Rewrite one comparator set into the comma-separated form `VersionReq` parses.
fn normalize_comparators(set: &str) -> String {
    let set = set.trim();
    if set.is_empty() {
        return "*".to_string();
    }
    if let Some((low, high)) = set.split_once(" - ") {
        return format!(">={}, <={}", low.trim(), high.trim());
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in set.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        // ">= 1.0.0" splits the operator from its version
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op.push_str(token);
            continue;
        }
        let comparator = format!("{}{}", std::mem::take(&mut pending_op), token);
        let bare = comparator.starts_with(|c: char| c.is_ascii_digit())
            && !comparator.contains(['x', 'X', '*']);
        comparators.push(if bare { format!("={}", comparator) } else { comparator });
    }
    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }
    comparators.join(", ")
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}
