//! Language-specific accent repair for roots left behind by affix removal.
//!
//! Stripping an affix can leave a root whose written accent no longer fits
//! the language's stress rules (`dámelo` → `dá`, `comprándolo` → `comprándo`).
//! An [`AccentPolicy`] rewrites the candidate list so the dictionary lookup
//! sees the spellings the root can actually have.

mod galician;
mod spanish;

pub use galician::GalicianPolicy;
pub use spanish::{
    SpanishPolicy, is_final_wrongly_accented, is_monosyllabic, is_penultimate_wrongly_accented,
};

use crate::rule::SuffixRule;

/// Orthographic repair strategy. Implementations are stateless.
pub trait AccentPolicy: Send + Sync {
    /// Rewrite candidate roots for `rule`. The result may be longer than the
    /// input.
    fn fix(&self, candidates: Vec<String>, rule: &SuffixRule) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Leaves candidates untouched (languages without written stress).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPolicy;

impl AccentPolicy for NullPolicy {
    fn fix(&self, candidates: Vec<String>, _rule: &SuffixRule) -> Vec<String> {
        candidates
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Pick the accent policy for an ISO 639-1 language code.
pub fn for_language(code: &str) -> Box<dyn AccentPolicy> {
    match code.to_ascii_lowercase().as_str() {
        "es" => Box::new(SpanishPolicy),
        "gl" => Box::new(GalicianPolicy),
        _ => Box::new(NullPolicy),
    }
}

/// Plain vowel to acute-accented vowel. Both directions go through this table.
const ACUTE: [(char, char); 5] = [('a', 'á'), ('e', 'é'), ('i', 'í'), ('o', 'ó'), ('u', 'ú')];

/// Any vowel, including grave and diaeresis forms.
pub fn is_vowel(c: char) -> bool {
    matches!(
        c,
        'a' | 'e'
            | 'i'
            | 'o'
            | 'u'
            | 'á'
            | 'é'
            | 'í'
            | 'ó'
            | 'ú'
            | 'à'
            | 'è'
            | 'ì'
            | 'ò'
            | 'ù'
            | 'ï'
            | 'ü'
    )
}

/// Plain, unmarked vowel.
pub fn is_vowel_unaccented(c: char) -> bool {
    ACUTE.iter().any(|(plain, _)| *plain == c)
}

/// Open vowels (`a`, `e`, `o` and their marked forms) as opposed to `i`/`u`.
pub fn is_open_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'o' | 'á' | 'é' | 'ó' | 'à' | 'è' | 'ò')
}

/// Acute-accented vowel.
pub fn is_accented(c: char) -> bool {
    ACUTE.iter().any(|(_, acute)| *acute == c)
}

pub fn has_any_accent(s: &str) -> bool {
    s.chars().any(is_accented)
}

/// `a` → `á`. Other characters, already accented ones included, are returned
/// unchanged.
pub fn put_accent(c: char) -> char {
    ACUTE
        .iter()
        .find(|(plain, _)| *plain == c)
        .map_or(c, |(_, acute)| *acute)
}

/// `á` → `a`. Other characters are returned unchanged.
pub fn remove_accent(c: char) -> char {
    ACUTE
        .iter()
        .find(|(_, acute)| *acute == c)
        .map_or(c, |(plain, _)| *plain)
}

pub fn remove_accents(s: &str) -> String {
    s.chars().map(remove_accent).collect()
}

/// Append `item` unless it is already present.
pub(crate) fn push_unique(out: &mut Vec<String>, item: String) {
    if !out.contains(&item) {
        out.push(item);
    }
}

/// One candidate per vowel position of the unaccented root, with only that
/// vowel accented. `only_plain` restricts the positions to unmarked vowels.
pub(crate) fn accent_each_vowel(out: &mut Vec<String>, root: &str, only_plain: bool) {
    let base: Vec<char> = root.chars().map(remove_accent).collect();
    for (i, c) in base.iter().enumerate() {
        let eligible = if only_plain {
            is_vowel_unaccented(*c)
        } else {
            is_vowel(*c)
        };
        if eligible {
            let mut variant = base.clone();
            variant[i] = put_accent(*c);
            push_unique(out, variant.into_iter().collect());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleRecord;

    #[test]
    fn accent_table_is_its_own_inverse() {
        for (plain, acute) in ACUTE {
            assert_eq!(put_accent(plain), acute);
            assert_eq!(remove_accent(acute), plain);
            assert_eq!(remove_accent(put_accent(plain)), plain);
            assert_eq!(put_accent(remove_accent(acute)), acute);
        }
    }

    #[test]
    fn accent_operations_are_idempotent() {
        for c in ['a', 'e', 'i', 'o', 'u'] {
            assert_eq!(remove_accent(c), c);
        }
        for c in ['á', 'é', 'í', 'ó', 'ú'] {
            assert_eq!(put_accent(c), c);
        }
        // Diaeresis and grave vowels are recognised but never rewritten.
        for c in ['ü', 'à', 'ï'] {
            assert!(is_vowel(c));
            assert_eq!(put_accent(c), c);
            assert_eq!(remove_accent(c), c);
        }
        assert_eq!(put_accent('n'), 'n');
    }

    #[test]
    fn null_policy_is_identity() {
        let rule = SuffixRule::from_record(&RuleRecord::suffix("s", "*", ".", "*")).unwrap();
        let input = vec!["pensa".to_string(), "pensar".to_string()];
        assert_eq!(NullPolicy.fix(input.clone(), &rule), input);
    }

    #[test]
    fn picks_policy_by_language() {
        assert_eq!(for_language("es").name(), "es");
        assert_eq!(for_language("GL").name(), "gl");
        assert_eq!(for_language("en").name(), "none");
    }
}
