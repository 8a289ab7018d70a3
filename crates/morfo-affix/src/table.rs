use std::collections::HashMap;
use std::sync::Arc;

use bitvec::prelude::*;

use crate::rule::SuffixRule;

type LengthSet = BitVec<usize, Lsb0>;

/// Rules keyed by their literal affix, plus the set of affix lengths present.
///
/// Lengths are counted in characters. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: HashMap<String, Vec<Arc<SuffixRule>>>,
    lengths: LengthSet,
    longest: usize,
    count: usize,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule under `key`, keeping insertion order per key.
    pub fn insert(&mut self, key: &str, rule: Arc<SuffixRule>) {
        let len = key.chars().count();
        if self.lengths.len() <= len {
            self.lengths.resize(len + 1, false);
        }
        self.lengths.set(len, true);
        self.longest = self.longest.max(len);
        self.rules.entry(key.to_string()).or_default().push(rule);
        self.count += 1;
    }

    /// Rules registered for exactly `affix`, in insertion order.
    pub fn rules_for(&self, affix: &str) -> &[Arc<SuffixRule>] {
        self.rules.get(affix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any affix of `len` characters is registered.
    pub fn has_length(&self, len: usize) -> bool {
        self.lengths.get(len).is_some_and(|bit| *bit)
    }

    /// Length of the longest registered affix (0 when empty).
    pub fn longest(&self) -> usize {
        self.longest
    }

    /// Number of rules (not keys).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Full and always-applicable tables for one affix kind.
#[derive(Clone, Debug, Default)]
pub(crate) struct AffixTables {
    pub(crate) all: RuleTable,
    pub(crate) always: RuleTable,
}

impl AffixTables {
    pub(crate) fn insert(&mut self, key: &str, rule: SuffixRule) {
        let rule = Arc::new(rule);
        if rule.always() {
            self.always.insert(key, Arc::clone(&rule));
        }
        self.all.insert(key, rule);
    }

    /// Table to use for a word: the always table once something else has
    /// analyzed it, the full table otherwise.
    pub(crate) fn for_word(&self, already_analyzed: bool) -> &RuleTable {
        if already_analyzed {
            &self.always
        } else {
            &self.all
        }
    }
}
