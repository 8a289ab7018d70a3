//! Line-oriented rule files.
//!
//! Each rule is one line of nine whitespace-separated fields:
//!
//! ```text
//! # key  terms   condition  tag  last_acc enclitic lemma always retok
//! lo     *       ^VMN       *    0        1        0     1      $$+lo:VMN+PP
//! ```
//!
//! `lemma` is `0` (dictionary lemma), `1` (surface form) or `2` (root);
//! `retok` is `-` when the rule does not split the token.
//!
//! Lines may instead carry ten fields, with a `nomore` flag between
//! `enclitic` and `lemma`:
//!
//! ```text
//! # key  terms   condition  tag  last_acc enclitic nomore lemma always retok
//! lo     *       ^VMN       *    0        1        1      0     1      $$+lo:VMN+PP
//! ``` Records following
//! a `<Prefixes>` line are prefix rules until `</Prefixes>`; everything else,
//! including files without section markers, is read as suffix rules.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::AffixError;
use crate::rule::{AffixKind, LemmaPolicy, RuleRecord};

const FIELDS: usize = 9;
const FIELDS_WITH_NOMORE: usize = 10;

/// Read and parse a rule file.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<RuleRecord>, AffixError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AffixError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_rules(&text)?;
    debug!("{} rules read from {}", records.len(), path.display());
    Ok(records)
}

/// Parse rule file text. Blank lines and `#` comments are skipped.
pub fn parse_rules(text: &str) -> Result<Vec<RuleRecord>, AffixError> {
    let mut records = Vec::new();
    let mut kind = AffixKind::Suffix;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line {
            "<Suffixes>" | "</Suffixes>" | "</Prefixes>" => {
                kind = AffixKind::Suffix;
                continue;
            }
            "<Prefixes>" => {
                kind = AffixKind::Prefix;
                continue;
            }
            _ => {}
        }
        records.push(parse_line(line, lineno + 1, kind)?);
    }
    if records.is_empty() {
        warn!("rule source contains no rules");
    }
    Ok(records)
}

fn parse_line(line: &str, lineno: usize, kind: AffixKind) -> Result<RuleRecord, AffixError> {
    let malformed = |reason: String| AffixError::MalformedRule {
        line: lineno,
        reason,
    };

    let mut fields: Vec<&str> = line.split_whitespace().collect();
    let nomore_field = match fields.len() {
        FIELDS => None,
        FIELDS_WITH_NOMORE => Some(fields.remove(6)),
        n => {
            return Err(malformed(format!(
                "expected {FIELDS} or {FIELDS_WITH_NOMORE} fields, found {n}"
            )));
        }
    };

    let flag = |name: &str, value: &str| match value {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(malformed(format!("{name} must be 0 or 1, got `{other}`"))),
    };
    let nomore = match nomore_field {
        Some(value) => flag("nomore", value)?,
        None => false,
    };
    let lemma_policy = LemmaPolicy::from_code(fields[6])
        .ok_or_else(|| malformed(format!("unknown lemma policy `{}`", fields[6])))?;

    Ok(RuleRecord {
        kind,
        key: fields[0].to_string(),
        termination: fields[1].to_string(),
        condition: fields[2].to_string(),
        output_tag: fields[3].to_string(),
        last_acc: flag("last_acc", fields[4])?,
        enclitic: flag("enclitic", fields[5])?,
        nomore,
        lemma_policy,
        always: flag("always", fields[7])?,
        retokenization: match fields[8] {
            "-" => None,
            spec => Some(spec.to_string()),
        },
    })
}
