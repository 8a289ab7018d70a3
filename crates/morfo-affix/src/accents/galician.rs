//! Galician stress repair.
//!
//! Galician enclitics behave differently from Spanish ones: future and some
//! present forms regain a final accent once the pronoun is removed
//! (`darache` → `dará`, `darasme` → `darás`), and the accusative allomorph
//! makes `comelo` ambiguous between `comer` + `o` and `comes` + `o`.

use tracing::trace;

use super::{
    AccentPolicy, accent_each_vowel, has_any_accent, is_accented, is_open_vowel, is_vowel,
    is_vowel_unaccented, push_unique, put_accent, remove_accents,
};
use crate::rule::SuffixRule;

/// Words whose accent is diacritic and must survive.
const DIACRITIC: [&str; 9] = [
    "cómpre", "cómpren", "dá", "dás", "é", "pór", "sé", "vén", "vés",
];

#[derive(Clone, Copy, Debug, Default)]
pub struct GalicianPolicy;

impl AccentPolicy for GalicianPolicy {
    fn fix(&self, candidates: Vec<String>, rule: &SuffixRule) -> Vec<String> {
        let candidates = resolve_accusative_allomorph(candidates);
        let mut roots = Vec::with_capacity(candidates.len() * 2);
        for candidate in candidates {
            let root = candidate.to_lowercase();
            if rule.enclitic() {
                let fixed = if !has_any_accent(&root) {
                    if needs_final_accent(&root) {
                        put_final_accent(&root)
                    } else {
                        root
                    }
                } else if accent_is_right(&root) {
                    root
                } else {
                    trace!("removing wrong accent from {root}");
                    remove_accents(&root)
                };
                push_unique(&mut roots, fixed);
            } else if rule.last_acc() {
                push_unique(&mut roots, root.clone());
                accent_each_vowel(&mut roots, &root, true);
            } else {
                push_unique(&mut roots, root);
            }
        }
        roots
    }

    fn name(&self) -> &'static str {
        "gl"
    }
}

/// Position that should carry the accent of a polysyllabic root ending in a
/// stressed plain vowel (`dara`) or in such a vowel plus `n`/`s` (`daras`).
fn final_accent_position(chars: &[char]) -> Option<usize> {
    let n = chars.len();
    if n == 0 || is_monosyllabic(chars) {
        return None;
    }
    let last = chars[n - 1];
    if is_vowel_unaccented(last) && last != 'u' {
        return Some(n - 1);
    }
    if n >= 2 {
        let prev = chars[n - 2];
        if is_vowel_unaccented(prev) && prev != 'u' && (last == 's' || last == 'n') {
            return Some(n - 2);
        }
    }
    None
}

fn needs_final_accent(root: &str) -> bool {
    let chars: Vec<char> = root.chars().collect();
    final_accent_position(&chars).is_some()
}

fn put_final_accent(root: &str) -> String {
    let mut chars: Vec<char> = root.chars().collect();
    if let Some(i) = final_accent_position(&chars) {
        chars[i] = put_accent(chars[i]);
    }
    chars.into_iter().collect()
}

fn is_stressed_open(c: char) -> bool {
    matches!(c, 'á' | 'é' | 'í' | 'ó')
}

/// Whether an accented enclitic root keeps its accent.
fn accent_is_right(root: &str) -> bool {
    if DIACRITIC.contains(&root) {
        return true;
    }
    let chars: Vec<char> = root.chars().collect();
    let n = chars.len();

    // Future forms: daráchemas, darásllela.
    if n >= 1 && !is_monosyllabic(&chars) {
        if is_stressed_open(chars[n - 1]) {
            return true;
        }
        if n >= 2 && is_stressed_open(chars[n - 2]) && matches!(chars[n - 1], 's' | 'n') {
            return true;
        }
    }

    // Past subjunctive plurals: cantásemos, cantásedes.
    if n >= 6
        && matches!(chars[n - 6], 'á' | 'é' | 'í')
        && chars[n - 5] == 's'
        && chars[n - 4] == 'e'
        && matches!(chars[n - 3], 'm' | 'd')
    {
        return true;
    }

    // Accented closed vowel in hiatus: comíalle, roínlle (but not quíxeno).
    for i in (1..n).rev() {
        let c = chars[i];
        if !(is_accented(c) && !is_open_vowel(c)) {
            continue;
        }
        if chars.get(i + 1).is_some_and(|next| is_vowel_unaccented(*next)) {
            return true;
        }
        let prev = chars[i - 1];
        if is_vowel_unaccented(prev) {
            let digraph = i >= 2 && matches!(chars[i - 2], 'g' | 'q') && prev == 'u' && c == 'í';
            return !digraph;
        }
    }
    false
}

fn is_monosyllabic(chars: &[char]) -> bool {
    let Some(last) = chars
        .iter()
        .rposition(|c| is_vowel(*c))
        .filter(|&i| i > 0)
    else {
        return false;
    };
    let prev_idx = last - 1;
    let (prev, cur) = (chars[prev_idx], chars[last]);

    if is_open_vowel(prev) && is_open_vowel(cur) {
        return false;
    }
    if is_accented(cur)
        && !is_open_vowel(cur)
        && chars.get(last + 1).is_some_and(|c| is_vowel_unaccented(*c))
    {
        return false;
    }
    if is_vowel_unaccented(prev) && !is_open_vowel(cur) && is_accented(cur) {
        return false;
    }

    let gu_qu = prev_idx >= 1
        && matches!(chars[prev_idx - 1], 'q' | 'g')
        && prev == 'u'
        && matches!(cur, 'e' | 'i' | 'é' | 'í');
    let diphthong = is_vowel(prev)
        && ((!is_accented(prev) && !is_open_vowel(prev))
            || (!is_accented(cur) && !is_open_vowel(cur)));
    if gu_qu || diphthong {
        return !chars[..prev_idx].iter().any(|c| is_vowel(*c));
    }
    !chars[..=prev_idx].iter().any(|c| is_vowel(*c))
}

/// `comelo` may be `comer` + `o` or `comes` + `o`. Between two candidates
/// that differ only in a final `r`/`s` after the same `a`/`e`/`o`, drop the
/// `-r` reading when both are accented (`cómelo` can only be `comes`), and
/// add the accented `-s` reading when neither is (`prevelo` → `prevés`).
fn resolve_accusative_allomorph(candidates: Vec<String>) -> Vec<String> {
    let lowered: Vec<Vec<char>> = candidates
        .iter()
        .map(|c| c.to_lowercase().chars().collect())
        .collect();
    let mut dropped = vec![false; candidates.len()];
    let mut extra = Vec::new();

    for (i, r_form) in lowered.iter().enumerate() {
        for (j, s_form) in lowered.iter().enumerate() {
            if i == j || !allomorph_pair(r_form, s_form) {
                continue;
            }
            let r_text: String = r_form.iter().collect();
            let s_text: String = s_form.iter().collect();
            match (has_any_accent(&r_text), has_any_accent(&s_text)) {
                (true, true) => dropped[i] = true,
                (false, false) if needs_final_accent(&s_text) => {
                    extra.push(put_final_accent(&s_text))
                }
                _ => {}
            }
        }
    }

    let mut out = Vec::with_capacity(candidates.len() + extra.len());
    for (candidate, drop) in candidates.into_iter().zip(dropped) {
        if !drop {
            push_unique(&mut out, candidate);
        }
    }
    for candidate in extra {
        push_unique(&mut out, candidate);
    }
    out
}

fn allomorph_pair(r_form: &[char], s_form: &[char]) -> bool {
    let n = r_form.len();
    n >= 2
        && s_form.len() == n
        && r_form[n - 1] == 'r'
        && s_form[n - 1] == 's'
        && matches!(r_form[n - 2], 'a' | 'e' | 'o')
        && r_form[..n - 1] == s_form[..n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleRecord;

    fn rule(last_acc: bool, enclitic: bool) -> SuffixRule {
        let mut record = RuleRecord::suffix("x", "*", ".", "*");
        record.last_acc = last_acc;
        record.enclitic = enclitic;
        SuffixRule::from_record(&record).unwrap()
    }

    fn fix(roots: &[&str], last_acc: bool, enclitic: bool) -> Vec<String> {
        let roots = roots.iter().map(|r| r.to_string()).collect();
        GalicianPolicy.fix(roots, &rule(last_acc, enclitic))
    }

    #[test]
    fn future_forms_regain_final_accent() {
        assert_eq!(fix(&["dara"], false, true), vec!["dará"]);
        assert_eq!(fix(&["daras"], false, true), vec!["darás"]);
    }

    #[test]
    fn monosyllables_and_u_endings_stay_plain() {
        assert_eq!(fix(&["da"], false, true), vec!["da"]);
        assert_eq!(fix(&["tribu"], false, true), vec!["tribu"]);
    }

    #[test]
    fn wrong_accents_are_removed() {
        assert_eq!(fix(&["cántaba"], false, true), vec!["cantaba"]);
        assert_eq!(fix(&["quíxen"], false, true), vec!["quixen"]);
    }

    #[test]
    fn right_accents_are_kept() {
        assert_eq!(fix(&["dá"], false, true), vec!["dá"]);
        assert_eq!(fix(&["dará"], false, true), vec!["dará"]);
        assert_eq!(fix(&["cantásemos"], false, true), vec!["cantásemos"]);
        assert_eq!(fix(&["comía"], false, true), vec!["comía"]);
        assert_eq!(fix(&["roín"], false, true), vec!["roín"]);
    }

    #[test]
    fn last_acc_tries_plain_vowels() {
        assert_eq!(
            fix(&["Canta"], true, false),
            vec!["canta", "cánta", "cantá"]
        );
    }

    #[test]
    fn plain_rules_keep_lowercased_root() {
        assert_eq!(fix(&["Canta"], false, false), vec!["canta"]);
    }

    #[test]
    fn accusative_allomorph_drops_accented_r_reading() {
        let out = resolve_accusative_allomorph(vec!["cómer".into(), "cómes".into()]);
        assert_eq!(out, vec!["cómes"]);
    }

    #[test]
    fn accusative_allomorph_adds_accented_s_reading() {
        let out = resolve_accusative_allomorph(vec!["prever".into(), "preves".into()]);
        assert_eq!(out, vec!["prever", "preves", "prevés"]);
    }
}
