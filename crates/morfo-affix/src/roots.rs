//! Candidate root expansion and dictionary validation.

use morfo_types::{Analysis, Dictionary, Word};
use tracing::trace;

use crate::rule::{AffixKind, LemmaPolicy, RetokenForm, SuffixRule};

/// Re-attach every termination of `rule` to `root`: appended for suffix
/// rules, prepended for prefix rules. One candidate per termination, in
/// pattern order.
pub fn generate_roots(kind: AffixKind, rule: &SuffixRule, root: &str) -> Vec<String> {
    rule.terminations()
        .map(|term| match kind {
            AffixKind::Suffix => format!("{root}{term}"),
            AffixKind::Prefix => format!("{term}{root}"),
        })
        .collect()
}

/// Look every distinct candidate up and merge the analyses `rule` derives
/// from the dictionary hits into `word`. Misses are skipped.
pub fn validate_roots<D>(candidates: &[String], rule: &SuffixRule, word: &mut Word, dict: &D)
where
    D: Dictionary + ?Sized,
{
    trace!("checking {} candidate roots", candidates.len());
    for (i, root) in candidates.iter().enumerate() {
        if candidates[..i].contains(root) {
            continue;
        }
        let readings = dict.search_form(root);
        if readings.is_empty() {
            trace!("root {root} not found");
            continue;
        }
        trace!("root {root} found with {} readings", readings.len());
        apply_rule(root, &readings, rule, word, dict);
    }
}

/// Derive analyses for `root` from its dictionary `readings` under `rule`.
pub(crate) fn apply_rule<D>(
    root: &str,
    readings: &[Analysis],
    rule: &SuffixRule,
    word: &mut Word,
    dict: &D,
) where
    D: Dictionary + ?Sized,
{
    for reading in readings {
        if !rule.accepts_tag(&reading.tag) {
            trace!("tag {} fails condition {}", reading.tag, rule.condition());
            continue;
        }
        if rule.nomore() {
            word.set_found_in_dict(true);
        }
        let tag = rule.output_tag_for(&reading.tag).to_string();
        let lemma = match rule.lemma_policy() {
            LemmaPolicy::FromDictionary => reading.lemma.clone(),
            LemmaPolicy::FromOriginalForm => word.form().to_lowercase(),
            LemmaPolicy::FromRoot => root.to_string(),
        };
        trace!("analysis for {root}: ({lemma},{tag})");

        let retokenization = retokenize(rule, root, &lemma, &tag, dict);
        merge_analysis(
            word,
            Analysis {
                lemma,
                tag,
                retokenization,
            },
        );
    }
}

/// Build the word list a rule's retokenization spec describes. Empty when
/// the rule has none.
///
/// `$$` becomes `root` carrying exactly `(lemma, tag)`; other forms carry
/// their dictionary analyses whose tag starts with the spec's tag.
pub fn retokenize<D>(rule: &SuffixRule, root: &str, lemma: &str, tag: &str, dict: &D) -> Vec<Word>
where
    D: Dictionary + ?Sized,
{
    let Some(spec) = rule.retokenization() else {
        return Vec::new();
    };
    spec.parts()
        .iter()
        .map(|part| match &part.form {
            RetokenForm::Root => {
                let mut w = Word::new(root);
                w.add_analysis(Analysis::new(lemma, tag));
                w
            }
            RetokenForm::Literal(form) => {
                let mut w = Word::new(form.as_str());
                for a in dict.search_form(form) {
                    if a.tag.starts_with(&part.tag_prefix) {
                        w.add_analysis(a);
                    }
                }
                w
            }
        })
        .collect()
}

/// Insert `analysis` unless `(lemma, tag)` is already there. An existing
/// entry without a retokenization inherits the new one; an existing
/// retokenization is never replaced.
pub fn merge_analysis(word: &mut Word, analysis: Analysis) {
    match word.find_analysis_mut(&analysis.lemma, &analysis.tag) {
        Some(existing) => {
            if analysis.is_retokenizable() && !existing.is_retokenizable() {
                trace!("grafting retokenization onto ({},{})", existing.lemma, existing.tag);
                existing.set_retokenization(analysis.retokenization);
            }
        }
        None => word.add_analysis(analysis),
    }
}
