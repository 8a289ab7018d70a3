//! Shared types passed between the morfo dictionary and affix stages.
//!
//! A [`Word`] carries its surface form and the [`Analysis`] records gathered
//! for it so far. Each analysis is a `(lemma, tag)` pair, optionally carrying
//! a retokenization: the list of words the surface token should be split into
//! when the analysis is chosen (e.g. a verb with an attached pronoun).
//!
//! [`Dictionary`] is the only lookup contract the analyzers need. Any
//! `Fn(&str) -> Vec<Analysis>` closure implements it, which keeps the analyzers
//! ignorant of a concrete database layout.
//!
//! ```rust
//! use morfo_types::{Analysis, Dictionary, Word};
//!
//! let dict = |form: &str| match form {
//!     "casa" => vec![Analysis::new("casa", "NCFS000")],
//!     _ => Vec::new(),
//! };
//! let mut word = Word::new("casa");
//! for a in dict.search_form(word.form()) {
//!     word.add_analysis(a);
//! }
//! assert_eq!(word.n_analyses(), 1);
//! ```

use std::fmt;

/// One morphological reading of a word: lemma, tag and optional split.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Analysis {
    pub lemma: String,
    pub tag: String,
    pub retokenization: Vec<Word>,
}

impl Analysis {
    pub fn new(lemma: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            tag: tag.into(),
            retokenization: Vec::new(),
        }
    }

    /// True when the analysis asks for the token to be re-split.
    pub fn is_retokenizable(&self) -> bool {
        !self.retokenization.is_empty()
    }

    pub fn set_retokenization(&mut self, words: Vec<Word>) {
        self.retokenization = words;
    }

    /// Whether this analysis is the same entry as `(lemma, tag)`.
    pub fn matches(&self, lemma: &str, tag: &str) -> bool {
        self.lemma == lemma && self.tag == tag
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.lemma, self.tag)?;
        if self.is_retokenizable() {
            f.write_str(" ->")?;
            for w in &self.retokenization {
                write!(f, " {}", w.form)?;
            }
        }
        Ok(())
    }
}

/// A surface token plus the analyses attached by earlier stages.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Word {
    form: String,
    analyses: Vec<Analysis>,
    found_in_dict: bool,
}

impl Word {
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            analyses: Vec::new(),
            found_in_dict: false,
        }
    }

    pub fn form(&self) -> &str {
        &self.form
    }

    pub fn set_form(&mut self, form: impl Into<String>) {
        self.form = form.into();
    }

    pub fn analyses(&self) -> &[Analysis] {
        &self.analyses
    }

    pub fn n_analyses(&self) -> usize {
        self.analyses.len()
    }

    /// Append an analysis as-is. Callers that must keep `(lemma, tag)` unique
    /// check [`Word::find_analysis_mut`] first.
    pub fn add_analysis(&mut self, analysis: Analysis) {
        self.analyses.push(analysis);
    }

    pub fn find_analysis_mut(&mut self, lemma: &str, tag: &str) -> Option<&mut Analysis> {
        self.analyses.iter_mut().find(|a| a.matches(lemma, tag))
    }

    pub fn has_analysis(&self, lemma: &str, tag: &str) -> bool {
        self.analyses.iter().any(|a| a.matches(lemma, tag))
    }

    /// Set when a dictionary stage recognised the form.
    pub fn is_found_in_dict(&self) -> bool {
        self.found_in_dict
    }

    pub fn set_found_in_dict(&mut self, found: bool) {
        self.found_in_dict = found;
    }
}

/// Read-only form lookup returning every `(lemma, tag)` reading of a form.
///
/// Misses return an empty list; they are never an error.
pub trait Dictionary {
    fn search_form(&self, form: &str) -> Vec<Analysis>;
}

impl<F> Dictionary for F
where
    F: Fn(&str) -> Vec<Analysis>,
{
    fn search_form(&self, form: &str) -> Vec<Analysis> {
        self(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retokenizable_only_with_words() {
        let mut a = Analysis::new("dar", "VMN0000");
        assert!(!a.is_retokenizable());
        a.set_retokenization(vec![Word::new("dar"), Word::new("lo")]);
        assert!(a.is_retokenizable());
        assert_eq!(a.to_string(), "(dar,VMN0000) -> dar lo");
    }

    #[test]
    fn finds_analysis_by_lemma_and_tag() {
        let mut w = Word::new("canto");
        w.add_analysis(Analysis::new("canto", "NCMS000"));
        w.add_analysis(Analysis::new("cantar", "VMIP1S0"));
        assert!(w.has_analysis("cantar", "VMIP1S0"));
        assert!(!w.has_analysis("cantar", "NCMS000"));
        w.find_analysis_mut("canto", "NCMS000")
            .unwrap()
            .set_retokenization(vec![Word::new("canto")]);
        assert!(w.analyses()[0].is_retokenizable());
    }

    #[test]
    fn closures_are_dictionaries() {
        fn lookup<D: Dictionary>(d: D, form: &str) -> usize {
            d.search_form(form).len()
        }
        let dict = |form: &str| {
            if form == "lo" {
                vec![Analysis::new("lo", "PP3MSA00"), Analysis::new("lo", "DA0NS0")]
            } else {
                Vec::new()
            }
        };
        assert_eq!(lookup(&dict, "lo"), 2);
        assert_eq!(lookup(dict, "la"), 0);
    }
}
