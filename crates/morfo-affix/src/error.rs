use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while building an analyzer. Lookups never fail.
#[derive(Debug, Error)]
pub enum AffixError {
    #[error("invalid condition `{pattern}` in rule for affix `{key}`: {source}")]
    InvalidRuleCondition {
        key: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed retokenization `{spec}` in rule for affix `{key}`: {reason}")]
    MalformedRetokenization {
        key: String,
        spec: String,
        reason: String,
    },

    #[error("line {line}: {reason}")]
    MalformedRule { line: usize, reason: String },

    #[error("failed to read rule file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
