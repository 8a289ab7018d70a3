use std::fmt;

use regex::Regex;

use crate::error::AffixError;

/// Placeholder standing for the root itself inside a retokenization spec.
pub const ROOT_PLACEHOLDER: &str = "$$";
/// Termination token meaning "append nothing".
pub const NULL_TERMINATION: &str = "*";
/// Output tag meaning "keep the tag found in the dictionary".
pub const KEEP_TAG: &str = "*";

/// Whether a rule matches the end or the start of a form.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AffixKind {
    Suffix,
    Prefix,
}

impl fmt::Display for AffixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AffixKind::Suffix => "suffix",
            AffixKind::Prefix => "prefix",
        })
    }
}

/// How the lemma of a produced analysis is built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LemmaPolicy {
    /// Lemma of the dictionary entry that validated the root.
    FromDictionary,
    /// The (lowercased) surface form being analyzed.
    FromOriginalForm,
    /// The candidate root itself.
    FromRoot,
}

impl LemmaPolicy {
    /// Decode the numeric code used in rule files (`0`, `1`, `2`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(LemmaPolicy::FromDictionary),
            "1" => Some(LemmaPolicy::FromOriginalForm),
            "2" => Some(LemmaPolicy::FromRoot),
            _ => None,
        }
    }
}

/// Tag assigned to analyses produced by a rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputTag {
    /// Reuse the tag of the dictionary entry.
    FromDictionary,
    Literal(String),
}

/// Uncompiled rule as read from a rule source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleRecord {
    pub kind: AffixKind,
    pub key: String,
    pub termination: String,
    pub condition: String,
    pub output_tag: String,
    pub last_acc: bool,
    pub enclitic: bool,
    pub nomore: bool,
    pub lemma_policy: LemmaPolicy,
    pub always: bool,
    pub retokenization: Option<String>,
}

impl RuleRecord {
    /// Suffix record with every flag off and the lemma taken from the dictionary.
    pub fn suffix(key: &str, termination: &str, condition: &str, output_tag: &str) -> Self {
        Self {
            kind: AffixKind::Suffix,
            key: key.to_string(),
            termination: termination.to_string(),
            condition: condition.to_string(),
            output_tag: output_tag.to_string(),
            last_acc: false,
            enclitic: false,
            nomore: false,
            lemma_policy: LemmaPolicy::FromDictionary,
            always: false,
            retokenization: None,
        }
    }

    /// Prefix counterpart of [`RuleRecord::suffix`].
    pub fn prefix(key: &str, termination: &str, condition: &str, output_tag: &str) -> Self {
        Self {
            kind: AffixKind::Prefix,
            ..Self::suffix(key, termination, condition, output_tag)
        }
    }
}

/// One element of a retokenization: the form to emit and the tag prefix
/// its dictionary analyses must carry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetokenPart {
    pub form: RetokenForm,
    pub tag_prefix: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RetokenForm {
    /// `$$`: the validated root, carrying the analysis the rule produced.
    Root,
    Literal(String),
}

/// Parsed `form1+form2:tag1+tag2` split recipe.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Retokenization {
    parts: Vec<RetokenPart>,
}

impl Retokenization {
    pub fn parse(spec: &str) -> Result<Self, String> {
        let (forms, tags) = spec
            .split_once(':')
            .ok_or_else(|| "missing `:` between forms and tags".to_string())?;
        let forms: Vec<&str> = forms.split('+').collect();
        let tags: Vec<&str> = tags.split('+').collect();
        if forms.len() != tags.len() {
            return Err(format!(
                "{} forms but {} tags",
                forms.len(),
                tags.len()
            ));
        }
        if forms.iter().any(|f| f.is_empty()) {
            return Err("empty form".to_string());
        }

        let parts = forms
            .into_iter()
            .zip(tags)
            .map(|(form, tag)| RetokenPart {
                form: if form == ROOT_PLACEHOLDER {
                    RetokenForm::Root
                } else {
                    RetokenForm::Literal(form.to_string())
                },
                tag_prefix: tag.to_string(),
            })
            .collect();
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[RetokenPart] {
        &self.parts
    }
}

/// Compiled, immutable affixation rule.
#[derive(Clone, Debug)]
pub struct SuffixRule {
    termination: String,
    condition: Regex,
    output_tag: OutputTag,
    lemma_policy: LemmaPolicy,
    last_acc: bool,
    enclitic: bool,
    nomore: bool,
    always: bool,
    retokenization: Option<Retokenization>,
}

impl SuffixRule {
    /// Compile a record. Bad conditions and retokenization specs fail here
    /// rather than at lookup time.
    pub fn from_record(record: &RuleRecord) -> Result<Self, AffixError> {
        let condition =
            Regex::new(&record.condition).map_err(|source| AffixError::InvalidRuleCondition {
                key: record.key.clone(),
                pattern: record.condition.clone(),
                source,
            })?;

        let retokenization = match record.retokenization.as_deref() {
            None => None,
            Some(spec) => Some(Retokenization::parse(spec).map_err(|reason| {
                AffixError::MalformedRetokenization {
                    key: record.key.clone(),
                    spec: spec.to_string(),
                    reason,
                }
            })?),
        };

        let output_tag = if record.output_tag == KEEP_TAG {
            OutputTag::FromDictionary
        } else {
            OutputTag::Literal(record.output_tag.clone())
        };

        Ok(Self {
            termination: record.termination.clone(),
            condition,
            output_tag,
            lemma_policy: record.lemma_policy,
            last_acc: record.last_acc,
            enclitic: record.enclitic,
            nomore: record.nomore,
            always: record.always,
            retokenization,
        })
    }

    /// Terminations to re-attach to a stripped root, `*` mapped to `""`.
    /// Always yields at least one item.
    pub fn terminations(&self) -> impl Iterator<Item = &str> + '_ {
        self.termination.split('|').map(|t| {
            if t == NULL_TERMINATION {
                ""
            } else {
                t
            }
        })
    }

    pub fn termination_pattern(&self) -> &str {
        &self.termination
    }

    /// Whether a dictionary tag satisfies the rule condition (unanchored search).
    pub fn accepts_tag(&self, tag: &str) -> bool {
        self.condition.is_match(tag)
    }

    pub fn condition(&self) -> &str {
        self.condition.as_str()
    }

    /// Tag for an analysis derived from a dictionary entry tagged `dict_tag`.
    pub fn output_tag_for<'a>(&'a self, dict_tag: &'a str) -> &'a str {
        match &self.output_tag {
            OutputTag::FromDictionary => dict_tag,
            OutputTag::Literal(tag) => tag.as_str(),
        }
    }

    pub fn output_tag(&self) -> &OutputTag {
        &self.output_tag
    }

    pub fn lemma_policy(&self) -> LemmaPolicy {
        self.lemma_policy
    }

    /// Try an accent on every vowel of the root.
    pub fn last_acc(&self) -> bool {
        self.last_acc
    }

    /// The affix is an attached (enclitic) pronoun.
    pub fn enclitic(&self) -> bool {
        self.enclitic
    }

    /// A firing rule marks the word as recognised so later stages add no
    /// guessed tags.
    pub fn nomore(&self) -> bool {
        self.nomore
    }

    /// Applied even to words the dictionary already recognised.
    pub fn always(&self) -> bool {
        self.always
    }

    pub fn retokenization(&self) -> Option<&Retokenization> {
        self.retokenization.as_ref()
    }
}
