//! Affix analysis for dictionary-backed morphology.
//!
//! Given a word form the dictionary does not know (or only partly knows),
//! hypothesise that it is a root plus a known affix: strip the affix,
//! rebuild the root spellings the rule allows, repair their accents, and keep
//! the ones the dictionary confirms. Rules for enclitic pronouns can also
//! attach a retokenization so later stages may split `dámelo` into
//! `da` + `me` + `lo`.
//!
//! # How it works
//! 1. For each affix length present in the rule table (shorter than the form),
//!    take the form's ending (suffixes) or beginning (prefixes).
//! 2. For every rule keyed by that affix, re-attach its terminations to the
//!    remaining root ([`generate_roots`]).
//! 3. Let the language's [`AccentPolicy`] rewrite the candidates.
//! 4. Look each candidate up; readings whose tag satisfies the rule condition
//!    become analyses of the word, deduplicated on `(lemma, tag)`
//!    ([`validate_roots`]).
//!
//! Words that already carry analyses only get rules flagged `always`.
//!
//! # Example
//! ```
//! use morfo_affix::{RuleRecord, SuffixAnalyzer, accents};
//! use morfo_types::{Analysis, Word};
//!
//! # fn main() -> Result<(), morfo_affix::AffixError> {
//! let mut rule = RuleRecord::suffix("lo", "*", "^VMN", "*");
//! rule.enclitic = true;
//! rule.retokenization = Some("$$+lo:VMN+PP".into());
//! let analyzer = SuffixAnalyzer::new([rule], accents::for_language("es"))?;
//!
//! let dict = |form: &str| match form {
//!     "dar" => vec![Analysis::new("dar", "VMN0000")],
//!     "lo" => vec![Analysis::new("lo", "PP3MSA00")],
//!     _ => Vec::new(),
//! };
//! let mut word = Word::new("darlo");
//! analyzer.look_for_suffixes(&mut word, &dict);
//! assert_eq!(word.analyses()[0].lemma, "dar");
//! assert_eq!(word.analyses()[0].retokenization.len(), 2);
//! # Ok(()) }
//! ```

pub mod accents;
mod error;
pub mod loader;
mod roots;
mod rule;
mod table;

use std::path::Path;

use morfo_types::{Dictionary, Word};
use tracing::{debug, info, trace};

pub use accents::AccentPolicy;
pub use error::AffixError;
pub use roots::{generate_roots, merge_analysis, retokenize, validate_roots};
pub use rule::{
    AffixKind, LemmaPolicy, OutputTag, RetokenForm, RetokenPart, Retokenization, RuleRecord,
    SuffixRule,
};
pub use table::RuleTable;

use table::AffixTables;

/// Affix analyzer: rule tables for suffixes and prefixes plus the accent
/// policy of the language. Immutable once built and safe to share between
/// threads.
pub struct SuffixAnalyzer {
    accents: Box<dyn AccentPolicy>,
    suffixes: AffixTables,
    prefixes: AffixTables,
}

impl SuffixAnalyzer {
    /// Compile `records` into rule tables. Fails on the first rule whose
    /// condition or retokenization spec is malformed.
    pub fn new<I>(records: I, accents: Box<dyn AccentPolicy>) -> Result<Self, AffixError>
    where
        I: IntoIterator<Item = RuleRecord>,
    {
        let mut suffixes = AffixTables::default();
        let mut prefixes = AffixTables::default();
        for record in records {
            let rule = SuffixRule::from_record(&record)?;
            match record.kind {
                AffixKind::Suffix => suffixes.insert(&record.key, rule),
                AffixKind::Prefix => prefixes.insert(&record.key, rule),
            }
        }
        info!(
            "affix analyzer ready: {} suffix rules, {} prefix rules, accents: {}",
            suffixes.all.len(),
            prefixes.all.len(),
            accents.name()
        );
        Ok(Self {
            accents,
            suffixes,
            prefixes,
        })
    }

    /// Load a rule file and build the analyzer from it.
    pub fn from_file(
        path: impl AsRef<Path>,
        accents: Box<dyn AccentPolicy>,
    ) -> Result<Self, AffixError> {
        Self::new(loader::load_rules(path)?, accents)
    }

    /// All suffix rules.
    pub fn suffix_rules(&self) -> &RuleTable {
        &self.suffixes.all
    }

    /// All prefix rules.
    pub fn prefix_rules(&self) -> &RuleTable {
        &self.prefixes.all
    }

    pub fn accent_policy(&self) -> &dyn AccentPolicy {
        self.accents.as_ref()
    }

    /// Add the analyses suffix rules can derive for `word`.
    pub fn look_for_suffixes<D>(&self, word: &mut Word, dict: &D)
    where
        D: Dictionary + ?Sized,
    {
        let table = self.suffixes.for_word(word.n_analyses() > 0);
        self.look_in_table(AffixKind::Suffix, table, word, dict);
    }

    /// Suffix rules, then prefix rules, then prefix+suffix decompositions.
    pub fn look_for_affixes<D>(&self, word: &mut Word, dict: &D)
    where
        D: Dictionary + ?Sized,
    {
        let known = word.n_analyses() > 0;
        if known {
            debug!(
                "known word {} with {} analyses, trying always-rules only",
                word.form(),
                word.n_analyses()
            );
        } else {
            debug!("unknown word {}, trying every affix rule", word.form());
        }
        let suffixes = self.suffixes.for_word(known);
        let prefixes = self.prefixes.for_word(known);
        self.look_in_table(AffixKind::Suffix, suffixes, word, dict);
        self.look_in_table(AffixKind::Prefix, prefixes, word, dict);
        self.look_for_combined(suffixes, prefixes, word, dict);
    }

    /// Dictionary stage entry point: add the form's own readings, record
    /// whether there were any, then try affix rules.
    pub fn annotate<D>(&self, word: &mut Word, dict: &D)
    where
        D: Dictionary + ?Sized,
    {
        let readings = dict.search_form(word.form());
        word.set_found_in_dict(!readings.is_empty());
        for reading in readings {
            merge_analysis(word, reading);
        }
        self.look_for_affixes(word, dict);
    }

    fn look_in_table<D>(&self, kind: AffixKind, table: &RuleTable, word: &mut Word, dict: &D)
    where
        D: Dictionary + ?Sized,
    {
        let form: Vec<char> = word.form().to_lowercase().chars().collect();
        let len = form.len();
        for i in 1..=table.longest().min(len.saturating_sub(1)) {
            if !table.has_length(i) {
                trace!("no {kind}es of length {i}");
                continue;
            }
            let (affix, root): (String, String) = match kind {
                AffixKind::Suffix => (form[len - i..].iter().collect(), form[..len - i].iter().collect()),
                AffixKind::Prefix => (form[..i].iter().collect(), form[i..].iter().collect()),
            };
            let rules = table.rules_for(&affix);
            if rules.is_empty() {
                trace!("no rules for {kind} {affix}");
                continue;
            }
            debug!("{} rules for {kind} {affix}, root {root}", rules.len());
            for rule in rules {
                trace!(
                    "trying [{affix} {} {} {:?}] on {root}",
                    rule.termination_pattern(),
                    rule.condition(),
                    rule.output_tag()
                );
                let candidates = generate_roots(kind, rule, &root);
                let candidates = self.accents.fix(candidates, rule);
                validate_roots(&candidates, rule, word, dict);
            }
        }
    }

    /// Forms made of one prefix, a root and one suffix. The prefix rule
    /// validates candidate roots into a scratch copy of the word; the suffix
    /// rule is then applied on top of the copy's readings. `found_in_dict`
    /// only stays set by this step when both rules are `nomore`.
    fn look_for_combined<D>(
        &self,
        suffixes: &RuleTable,
        prefixes: &RuleTable,
        word: &mut Word,
        dict: &D,
    ) where
        D: Dictionary + ?Sized,
    {
        if suffixes.is_empty() || prefixes.is_empty() {
            return;
        }
        let form: Vec<char> = word.form().to_lowercase().chars().collect();
        let len = form.len();
        for i in 1..=suffixes.longest().min(len.saturating_sub(1)) {
            if !suffixes.has_length(i) {
                continue;
            }
            let suffix: String = form[len - i..].iter().collect();
            let suffix_rules = suffixes.rules_for(&suffix);
            if suffix_rules.is_empty() {
                continue;
            }
            // Leave at least one character of root between the affixes.
            for j in (1..=prefixes.longest()).take_while(|j| *j < len - i) {
                if !prefixes.has_length(j) {
                    continue;
                }
                let prefix: String = form[..j].iter().collect();
                let prefix_rules = prefixes.rules_for(&prefix);
                if prefix_rules.is_empty() {
                    continue;
                }
                let root: String = form[j..len - i].iter().collect();
                debug!("trying decomposition {prefix}+{root}+{suffix}");
                let found_in_dict = word.is_found_in_dict();

                for suffix_rule in suffix_rules {
                    for prefix_rule in prefix_rules {
                        let mut candidates: Vec<String> = Vec::new();
                        let stems = self
                            .accents
                            .fix(generate_roots(AffixKind::Suffix, suffix_rule, &root), suffix_rule);
                        for stem in &stems {
                            let full = self.accents.fix(
                                generate_roots(AffixKind::Prefix, prefix_rule, stem),
                                prefix_rule,
                            );
                            for c in full {
                                if !candidates.contains(&c) {
                                    candidates.push(c);
                                }
                            }
                        }

                        let mut scratch = word.clone();
                        validate_roots(&candidates, prefix_rule, &mut scratch, dict);
                        if scratch.n_analyses() > 0 {
                            for c in &candidates {
                                roots::apply_rule(
                                    &format!("{prefix}{c}"),
                                    scratch.analyses(),
                                    suffix_rule,
                                    word,
                                    dict,
                                );
                            }
                        }

                        if !(suffix_rule.nomore() && prefix_rule.nomore()) {
                            word.set_found_in_dict(found_in_dict);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use morfo_types::Analysis;

    use super::*;
    use crate::accents::{NullPolicy, SpanishPolicy};

    fn fake_dict(entries: &[(&str, &str, &str)]) -> impl Fn(&str) -> Vec<Analysis> {
        let mut map: HashMap<String, Vec<Analysis>> = HashMap::new();
        for (form, lemma, tag) in entries {
            map.entry(form.to_string())
                .or_default()
                .push(Analysis::new(*lemma, *tag));
        }
        move |form: &str| map.get(form).cloned().unwrap_or_default()
    }

    fn enclitic(key: &str, condition: &str, retok: &str) -> RuleRecord {
        let mut r = RuleRecord::suffix(key, "*", condition, "*");
        r.enclitic = true;
        r.always = true;
        r.retokenization = Some(retok.to_string());
        r
    }

    #[test]
    fn strips_suffix_and_validates_root() {
        let analyzer = SuffixAnalyzer::new(
            [RuleRecord::suffix("s", "*", "^NC", "NCFP000")],
            Box::new(NullPolicy),
        )
        .unwrap();
        let dict = fake_dict(&[("casa", "casa", "NCFS000")]);
        let mut word = Word::new("casas");
        analyzer.look_for_suffixes(&mut word, &dict);
        assert_eq!(word.analyses(), &[Analysis::new("casa", "NCFP000")]);
    }

    #[test]
    fn enclitic_with_accent_repair_and_retokenization() {
        let analyzer = SuffixAnalyzer::new(
            [enclitic("lo", "^VM", "$$+lo:VM+PP")],
            Box::new(SpanishPolicy),
        )
        .unwrap();
        let dict = fake_dict(&[
            ("comprando", "comprar", "VMG0000"),
            ("lo", "lo", "PP3MSA00"),
            ("lo", "el", "DA0MS0"),
        ]);
        let mut word = Word::new("comprándolo");
        analyzer.look_for_suffixes(&mut word, &dict);

        assert_eq!(word.n_analyses(), 1);
        let a = &word.analyses()[0];
        assert_eq!((a.lemma.as_str(), a.tag.as_str()), ("comprar", "VMG0000"));
        assert_eq!(a.retokenization[0].form(), "comprando");
        assert_eq!(a.retokenization[1].analyses(), &[Analysis::new("lo", "PP3MSA00")]);
    }

    #[test]
    fn known_words_only_get_always_rules() {
        let mut plain = RuleRecord::suffix("s", "*", ".", "*");
        plain.always = false;
        let analyzer = SuffixAnalyzer::new(
            [plain, enclitic("lo", "^VMN", "$$+lo:VMN+PP")],
            Box::new(NullPolicy),
        )
        .unwrap();
        let dict = fake_dict(&[("darlo", "darlo", "NP00000"), ("darl", "x", "VMN0000")]);

        let mut known = Word::new("darlos");
        known.add_analysis(Analysis::new("darlos", "NP00000"));
        analyzer.look_for_suffixes(&mut known, &dict);
        assert_eq!(known.n_analyses(), 1);

        let mut unknown = Word::new("darlos");
        analyzer.look_for_suffixes(&mut unknown, &dict);
        assert!(unknown.has_analysis("darlo", "NP00000"));
    }

    #[test]
    fn every_matching_rule_contributes() {
        let analyzer = SuffixAnalyzer::new(
            [
                RuleRecord::suffix("aba", "ar", "^VMN", "VMII3S0"),
                RuleRecord::suffix("ba", "r", "^VMN", "VMII3S0"),
                RuleRecord::suffix("a", "o", "^NC", "NCFS000"),
            ],
            Box::new(NullPolicy),
        )
        .unwrap();
        let dict = fake_dict(&[
            ("cantar", "cantar", "VMN0000"),
            ("cantabo", "cantabo", "NCMS000"),
        ]);
        let mut word = Word::new("cantaba");
        analyzer.look_for_suffixes(&mut word, &dict);
        // "aba" and "ba" both reach cantar; the analysis is kept once.
        assert_eq!(word.n_analyses(), 2);
        assert!(word.has_analysis("cantar", "VMII3S0"));
        assert!(word.has_analysis("cantabo", "NCFS000"));
    }

    #[test]
    fn never_tries_unknown_lengths_or_whole_form() {
        let analyzer = SuffixAnalyzer::new(
            [
                RuleRecord::suffix("s", "*", ".", "*"),
                RuleRecord::suffix("ones", "*", ".", "*"),
            ],
            Box::new(NullPolicy),
        )
        .unwrap();
        let looked_up = RefCell::new(Vec::new());
        let dict = |form: &str| {
            looked_up.borrow_mut().push(form.to_string());
            Vec::new()
        };

        let mut word = Word::new("canciones");
        analyzer.look_for_suffixes(&mut word, &dict);
        // Lengths 2 and 3 are not in the table.
        assert_eq!(*looked_up.borrow(), vec!["cancione", "canci"]);

        looked_up.borrow_mut().clear();
        let mut short = Word::new("ones");
        analyzer.look_for_suffixes(&mut short, &dict);
        assert_eq!(*looked_up.borrow(), vec!["one"]);
    }

    #[test]
    fn suffix_matching_ignores_case() {
        let mut rule = RuleRecord::suffix("s", "*", "^NC", "NCFP000");
        rule.lemma_policy = LemmaPolicy::FromOriginalForm;
        let analyzer = SuffixAnalyzer::new([rule], Box::new(NullPolicy)).unwrap();
        let dict = fake_dict(&[("casa", "casa", "NCFS000")]);
        let mut word = Word::new("CASAS");
        analyzer.look_for_suffixes(&mut word, &dict);
        assert_eq!(word.analyses(), &[Analysis::new("casas", "NCFP000")]);
    }

    #[test]
    fn prefix_rules_prepend_terminations() {
        let mut pre = RuleRecord::prefix("re", "*", "^VMN", "*");
        pre.lemma_policy = LemmaPolicy::FromOriginalForm;
        let analyzer = SuffixAnalyzer::new([pre], Box::new(NullPolicy)).unwrap();
        let dict = fake_dict(&[("hacer", "hacer", "VMN0000")]);
        let mut word = Word::new("rehacer");

        analyzer.look_for_suffixes(&mut word, &dict);
        assert_eq!(word.n_analyses(), 0);

        analyzer.look_for_affixes(&mut word, &dict);
        assert_eq!(word.analyses(), &[Analysis::new("rehacer", "VMN0000")]);
    }

    #[test]
    fn combines_prefix_and_suffix() {
        let mut pre = RuleRecord::prefix("re", "*", "^VMN", "*");
        pre.lemma_policy = LemmaPolicy::FromOriginalForm;
        let suf = RuleRecord::suffix("lo", "*", "^VMN", "*");
        let analyzer = SuffixAnalyzer::new([pre, suf], Box::new(NullPolicy)).unwrap();
        let dict = fake_dict(&[("hacer", "hacer", "VMN0000")]);

        let mut word = Word::new("rehacerlo");
        analyzer.look_for_affixes(&mut word, &dict);
        assert_eq!(word.analyses(), &[Analysis::new("rehacerlo", "VMN0000")]);
    }

    #[test]
    fn annotate_marks_dictionary_hits() {
        let analyzer = SuffixAnalyzer::new(
            [enclitic("lo", "^VMN", "$$+lo:VMN+PP")],
            Box::new(NullPolicy),
        )
        .unwrap();
        let dict = fake_dict(&[("dar", "dar", "VMN0000"), ("lo", "lo", "PP3MSA00")]);

        let mut known = Word::new("dar");
        analyzer.annotate(&mut known, &dict);
        assert!(known.is_found_in_dict());
        assert_eq!(known.n_analyses(), 1);

        let mut glued = Word::new("darlo");
        analyzer.annotate(&mut glued, &dict);
        assert!(!glued.is_found_in_dict());
        assert!(glued.analyses()[0].is_retokenizable());
    }

    #[test]
    fn nomore_rule_marks_unknown_word_as_found() {
        let mut rule = enclitic("lo", "^VMN", "$$+lo:VMN+PP");
        rule.nomore = true;
        let analyzer = SuffixAnalyzer::new([rule], Box::new(NullPolicy)).unwrap();
        let dict = fake_dict(&[("dar", "dar", "VMN0000"), ("lo", "lo", "PP3MSA00")]);

        let mut glued = Word::new("darlo");
        analyzer.annotate(&mut glued, &dict);
        assert!(glued.is_found_in_dict());
        assert_eq!(glued.n_analyses(), 1);

        // No rule fires: the flag stays as the dictionary left it.
        let mut unknown = Word::new("verlo");
        analyzer.annotate(&mut unknown, &dict);
        assert!(!unknown.is_found_in_dict());
    }

    #[test]
    fn combined_keeps_found_flag_only_when_both_rules_say_nomore() {
        let dict = fake_dict(&[("hacer", "hacer", "VMN0000")]);
        for (pre_nomore, suf_nomore, expected) in [
            (true, false, false),
            (false, true, false),
            (true, true, true),
        ] {
            let mut pre = RuleRecord::prefix("re", "*", "^VMN", "*");
            pre.lemma_policy = LemmaPolicy::FromOriginalForm;
            pre.nomore = pre_nomore;
            let mut suf = RuleRecord::suffix("lo", "*", "^VMN", "*");
            suf.nomore = suf_nomore;
            let analyzer = SuffixAnalyzer::new([pre, suf], Box::new(NullPolicy)).unwrap();

            let mut word = Word::new("rehacerlo");
            analyzer.look_for_affixes(&mut word, &dict);
            assert!(word.has_analysis("rehacerlo", "VMN0000"));
            assert_eq!(word.is_found_in_dict(), expected);
        }
    }

    #[test]
    fn combined_builds_on_existing_readings() {
        let mut pre = RuleRecord::prefix("re", "*", "^VMN", "*");
        pre.lemma_policy = LemmaPolicy::FromOriginalForm;
        pre.always = true;
        let mut suf = RuleRecord::suffix("lo", "*", "^VMN", "VMNLO00");
        suf.always = true;
        let analyzer = SuffixAnalyzer::new([pre, suf], Box::new(NullPolicy)).unwrap();
        let dict = fake_dict(&[("hacer", "hacer", "VMN0000")]);

        let mut word = Word::new("rehacerlo");
        word.add_analysis(Analysis::new("hacer", "VMN0000"));
        analyzer.look_for_affixes(&mut word, &dict);
        assert_eq!(word.n_analyses(), 3);
        assert!(word.has_analysis("hacer", "VMNLO00"));
        assert!(word.has_analysis("rehacerlo", "VMNLO00"));
    }

    #[test]
    fn rejects_bad_condition() {
        let err = SuffixAnalyzer::new(
            [
                RuleRecord::suffix("s", "*", "^N", "*"),
                RuleRecord::suffix("es", "*", "[", "*"),
            ],
            Box::new(NullPolicy),
        )
        .err()
        .expect("bad regex");
        assert!(matches!(err, AffixError::InvalidRuleCondition { ref key, .. } if key == "es"));
    }

    #[test]
    fn analyzer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SuffixAnalyzer>();
    }
}
