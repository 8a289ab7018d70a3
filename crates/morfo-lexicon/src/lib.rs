//! Load form dictionaries with zero-copy lemma and tag text.
//!
//! The on-disk format is one entry per line: a surface form followed by one
//! or more `lemma tag` pairs, whitespace separated.
//!
//! ```text
//! # form   lemma  tag      [lemma tag ...]
//! canto    canto  NCMS000  cantar VMIP1S0
//! dar      dar    VMN0000
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Forms are keyed in
//! lowercase and lookups lowercase their argument, so `Canto` and `canto`
//! resolve to the same entry. Lemma and tag text borrows from the backing
//! buffer, which is either memory-mapped or read into memory ([`LoadMode`]).
//!
//! # Example
//! ```no_run
//! use morfo_lexicon::{LoadMode, Lexicon};
//! use morfo_types::Dictionary;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lex = Lexicon::load_with_mode("/path/to/dicc.src", LoadMode::Mmap)?;
//! for a in lex.search_form("canto") {
//!     println!("{} {}", a.lemma, a.tag);
//! }
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;
use morfo_types::{Analysis, Dictionary};
use tracing::info;

/// Strategy for loading the dictionary file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy)]
struct TextRef {
    start: usize,
    len: usize,
}

struct Reading {
    lemma: TextRef,
    tag: TextRef,
}

/// In-memory form index backed by mmap or an owned buffer.
pub struct Lexicon {
    buffer: Buffer,
    forms: HashMap<String, Vec<Reading>>,
    readings: usize,
}

impl Lexicon {
    /// Load a dictionary file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a dictionary file choosing between mmap and owned buffers.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        let lex = Self::from_buffer(buffer)
            .with_context(|| format!("parse lexicon {}", path.display()))?;
        info!(
            "lexicon {} loaded: {} forms, {} readings",
            path.display(),
            lex.form_count(),
            lex.analysis_count()
        );
        Ok(lex)
    }

    /// Parse dictionary text held in memory.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_buffer(Buffer::Owned(text.as_bytes().to_vec()))
    }

    /// Build a lexicon from `(form, lemma, tag)` triples.
    ///
    /// Fails on an empty token or one containing whitespace, since it cannot
    /// be stored in the line format.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (n, (form, lemma, tag)) in entries.into_iter().enumerate() {
            let (form, lemma, tag) = (form.as_ref(), lemma.as_ref(), tag.as_ref());
            if let Some(bad) = [form, lemma, tag]
                .into_iter()
                .find(|t| t.is_empty() || t.contains(char::is_whitespace))
            {
                anyhow::bail!("entry {}: invalid token {:?}", n + 1, bad);
            }
            text.push_str(form);
            text.push(' ');
            text.push_str(lemma);
            text.push(' ');
            text.push_str(tag);
            text.push('\n');
        }
        Self::from_buffer(Buffer::Owned(text.into_bytes()))
    }

    fn from_buffer(buffer: Buffer) -> Result<Self> {
        let bytes = buffer.as_slice();
        std::str::from_utf8(bytes).context("lexicon is not valid utf8")?;

        let mut forms: HashMap<String, Vec<Reading>> = HashMap::new();
        let mut readings = 0usize;
        for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = strip_cr(raw_line);
            if line.is_empty() || line.first() == Some(&b'#') {
                continue;
            }
            let line_str = std::str::from_utf8(line)?;
            let tokens: Vec<&str> = line_str.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() < 3 || (tokens.len() - 1) % 2 != 0 {
                anyhow::bail!(
                    "line {}: expected a form followed by lemma/tag pairs, got {} tokens",
                    lineno + 1,
                    tokens.len()
                );
            }

            let entry = forms.entry(normalize_form(tokens[0])).or_default();
            for pair in tokens[1..].chunks_exact(2) {
                entry.push(Reading {
                    lemma: text_ref(bytes, pair[0]),
                    tag: text_ref(bytes, pair[1]),
                });
                readings += 1;
            }
        }

        Ok(Self {
            buffer,
            forms,
            readings,
        })
    }

    /// Whether the (lowercased) form has at least one reading.
    pub fn contains(&self, form: &str) -> bool {
        self.forms.contains_key(&normalize_form(form))
    }

    /// Borrowed `(lemma, tag)` pairs for a form, in file order.
    pub fn readings(&self, form: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.forms
            .get(&normalize_form(form))
            .into_iter()
            .flatten()
            .map(|r| (self.text(r.lemma), self.text(r.tag)))
    }

    /// Number of distinct forms.
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// Number of `(lemma, tag)` readings across all forms.
    pub fn analysis_count(&self) -> usize {
        self.readings
    }

    fn text(&self, r: TextRef) -> &str {
        let slice = &self.buffer.as_slice()[r.start..r.start + r.len];
        std::str::from_utf8(slice).expect("lexicon text validated at load")
    }
}

impl Dictionary for Lexicon {
    fn search_form(&self, form: &str) -> Vec<Analysis> {
        self.readings(form)
            .map(|(lemma, tag)| Analysis::new(lemma, tag))
            .collect()
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn text_ref(root: &[u8], token: &str) -> TextRef {
    let start = token.as_ptr() as usize - root.as_ptr() as usize;
    TextRef {
        start,
        len: token.len(),
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

fn normalize_form(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_readings_per_line() {
        let lex = Lexicon::from_text("canto canto NCMS000 cantar VMIP1S0\r\n\n# comment\n").unwrap();
        let got: Vec<_> = lex.readings("canto").collect();
        assert_eq!(got, vec![("canto", "NCMS000"), ("cantar", "VMIP1S0")]);
        assert_eq!(lex.form_count(), 1);
        assert_eq!(lex.analysis_count(), 2);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let lex = Lexicon::from_entries([("Árbol", "árbol", "NCMS000")]).unwrap();
        assert!(lex.contains("ÁRBOL"));
        assert_eq!(lex.search_form("árbol")[0].lemma, "árbol");
    }

    #[test]
    fn repeated_forms_accumulate() {
        let lex =
            Lexicon::from_entries([("lo", "lo", "PP3MSA00"), ("lo", "el", "DA0NS0")]).unwrap();
        assert_eq!(lex.search_form("lo").len(), 2);
        assert_eq!(lex.form_count(), 1);
    }

    #[test]
    fn rejects_unrepresentable_entries() {
        let err = Lexicon::from_entries([("lo", "lo", "PP3MSA00"), ("bad form", "x", "Y")])
            .err()
            .expect("whitespace in form");
        assert!(err.to_string().contains("entry 2"));
        assert!(Lexicon::from_entries([("casa", "", "NCFS000")]).is_err());
    }

    #[test]
    fn rejects_dangling_lemma() {
        let err = Lexicon::from_text("dar dar VMN0000\ncasa casa\n")
            .err()
            .expect("odd token count");
        assert!(err.to_string().contains("line 2"));
    }
}
