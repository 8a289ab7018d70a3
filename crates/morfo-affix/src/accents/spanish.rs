//! Spanish stress repair.
//!
//! Enclitic pronouns shift the written accent: `da` + `me` + `lo` is written
//! `dámelo`, `comprando` + `lo` is `comprándolo`. Once the pronoun is stripped
//! the root may carry an accent it should not have, or lack one it needs.
//! Ordinary inflection (`last_acc` rules) instead leaves the stressed syllable
//! unknown, so every vowel position is tried.

use tracing::trace;

use super::{
    AccentPolicy, accent_each_vowel, has_any_accent, is_accented, is_open_vowel, is_vowel,
    is_vowel_unaccented, push_unique, put_accent, remove_accents,
};
use crate::rule::SuffixRule;

#[derive(Clone, Copy, Debug, Default)]
pub struct SpanishPolicy;

impl AccentPolicy for SpanishPolicy {
    fn fix(&self, candidates: Vec<String>, rule: &SuffixRule) -> Vec<String> {
        let mut roots = Vec::with_capacity(candidates.len() * 2);
        for root in candidates {
            push_unique(&mut roots, root.clone());

            if rule.enclitic() {
                let fixed = fix_enclitic_root(&root);
                trace!("enclitic root {root} -> {fixed}");
                push_unique(&mut roots, fixed);
            } else if rule.last_acc() {
                trace!("trying an accent on each vowel of {root}");
                accent_each_vowel(&mut roots, &root, false);
            }
        }
        roots
    }

    fn name(&self) -> &'static str {
        "es"
    }
}

fn fix_enclitic_root(root: &str) -> String {
    if is_penultimate_wrongly_accented(root) || is_final_wrongly_accented(root) {
        return remove_accents(root);
    }

    let accented = has_any_accent(root);
    let monosyllabic = is_monosyllabic(root);
    if !accented && !monosyllabic {
        let ends_right = root
            .chars()
            .last()
            .is_some_and(|c| c == 'n' || c == 's' || is_vowel_unaccented(c));
        if ends_right {
            return accent_last_plain_vowel(root);
        }
    } else if monosyllabic && accented {
        return remove_accents(root);
    }
    root.to_string()
}

/// Accent the last unmarked vowel. A root without one comes back unchanged.
fn accent_last_plain_vowel(root: &str) -> String {
    let mut chars: Vec<char> = root.chars().collect();
    if let Some(i) = chars.iter().rposition(|c| is_vowel_unaccented(*c)) {
        chars[i] = put_accent(chars[i]);
    }
    chars.into_iter().collect()
}

fn lowered(s: &str) -> Vec<char> {
    s.to_lowercase().chars().collect()
}

/// Index of the last vowel, if there is one and it is not the first letter.
/// Roots failing this have no usable stress point.
fn stress_anchor(chars: &[char]) -> Option<usize> {
    chars
        .iter()
        .rposition(|c| is_vowel(*c))
        .filter(|&i| i > 0)
}

/// Step back from the last vowel over a diphthong, if any. Returns `Err`
/// with the verdict when the vowel pair already decides the question, or
/// `Ok(index)` of the position to search backwards from for the previous
/// syllable (`None` when nothing precedes).
fn previous_syllable_start(
    chars: &[char],
    last: usize,
    on_hiatus: bool,
    on_broken_diphthong: bool,
    on_nothing_before: bool,
) -> Result<usize, bool> {
    let prev = last - 1;
    if !is_vowel(chars[prev]) {
        return Ok(prev);
    }
    if is_open_vowel(chars[prev]) && is_open_vowel(chars[last]) {
        return Err(on_hiatus);
    }
    if is_accented(chars[prev]) && !is_open_vowel(chars[prev]) {
        return Err(on_broken_diphthong);
    }
    if prev == 0 {
        return Err(on_nothing_before);
    }
    Ok(prev - 1)
}

/// Stress on the penultimate syllable but written with an accent there
/// (`comído`): the accent is superfluous. A *llana acentuada*.
#[doc(alias = "is_unstressed_penultimate_wrongly_accented")]
#[doc(alias = "llana_acentuada")]
pub fn is_penultimate_wrongly_accented(root: &str) -> bool {
    let chars = lowered(root);
    let Some(last) = stress_anchor(&chars) else {
        return false;
    };
    // Hiatus ("cacáo"): the first vowel of the pair decides.
    let hiatus_accented = is_accented(chars[last - 1]);
    match previous_syllable_start(&chars, last, hiatus_accented, false, false) {
        Err(verdict) => verdict,
        Ok(from) => chars[..=from]
            .iter()
            .rposition(|c| is_vowel(*c))
            .is_some_and(|i| is_accented(chars[i])),
    }
}

/// Accent on the last vowel while the word continues with a letter other
/// than `n` or `s` (`comprár`). An *aguda mal acentuada*.
#[doc(alias = "is_stressed_final_wrongly_accented")]
#[doc(alias = "aguda_mal_acentuada")]
pub fn is_final_wrongly_accented(root: &str) -> bool {
    let chars = lowered(root);
    if chars.is_empty() {
        return false;
    }
    let last = chars.iter().rposition(|c| is_vowel(*c)).unwrap_or(0);
    is_accented(chars[last])
        && chars
            .get(last + 1)
            .is_some_and(|next| *next != 'n' && *next != 's')
}

/// Single-syllable root. Roots without a usable stress point are not
/// considered monosyllabic.
pub fn is_monosyllabic(root: &str) -> bool {
    let chars = lowered(root);
    let Some(last) = stress_anchor(&chars) else {
        return false;
    };
    match previous_syllable_start(&chars, last, false, false, true) {
        Err(verdict) => verdict,
        Ok(from) => !chars[..=from].iter().any(|c| is_vowel(*c)),
    }
}
