//! Bucketed affix rule indices for O(1) candidate narrowing.
//!
//! Rules are bucketed by the first (prefix) or last (suffix) one and two
//! characters of their affix text, plus a dedicated bucket for rules whose
//! affix is empty (those must always be tried, since there is no substring
//! to key them on).

use std::collections::HashMap;

use crate::aff::AffixRule;

#[derive(Debug, Default)]
pub(crate) struct AffixIndex {
    rules: Vec<AffixRule>,
    buckets: HashMap<String, Vec<usize>>,
    empty_affix: Vec<usize>,
}

impl AffixIndex {
    pub(crate) fn build_suffix(rules: Vec<AffixRule>) -> Self {
        Self::build(rules, |affix| bucket_keys(affix, true))
    }

    pub(crate) fn build_prefix(rules: Vec<AffixRule>) -> Self {
        Self::build(rules, |affix| bucket_keys(affix, false))
    }

    fn build(rules: Vec<AffixRule>, key_fn: impl Fn(&str) -> Vec<String>) -> Self {
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        let mut empty_affix = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.affix.is_empty() {
                empty_affix.push(index);
                continue;
            }
            for key in key_fn(&rule.affix) {
                buckets.entry(key).or_default().push(index);
            }
        }
        AffixIndex { rules, buckets, empty_affix }
    }

    /// Candidate rules worth trying against `word`: the empty-affix bucket
    /// plus whichever buckets match `word`'s trailing/leading characters,
    /// deduplicated.
    pub(crate) fn candidates(&self, word: &str, from_end: bool) -> Vec<&AffixRule> {
        let mut indices: Vec<usize> = self.empty_affix.clone();
        for key in bucket_keys(word, from_end) {
            if let Some(found) = self.buckets.get(&key) {
                indices.extend(found.iter().copied());
            }
        }
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| &self.rules[i]).collect()
    }
}

fn bucket_keys(text: &str, from_end: bool) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut keys = Vec::new();
    if chars.is_empty() {
        return keys;
    }
    if from_end {
        keys.push(chars[chars.len() - 1].to_string());
        if chars.len() >= 2 {
            keys.push(chars[chars.len() - 2..].iter().collect());
        }
    } else {
        keys.push(chars[0].to_string());
        if chars.len() >= 2 {
            keys.push(chars[..2].iter().collect());
        }
    }
    keys
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aff::AffixRule;

    fn rule(flag: &str, affix: &str) -> AffixRule {
        AffixRule { flag: flag.to_string(), cross_product: false, strip: String::new(), affix: affix.to_string(), condition: None }
    }

    #[test]
    fn candidates_match_by_trailing_characters() {
        let index = AffixIndex::build_suffix(vec![rule("A", "ing"), rule("B", "ed")]);
        let candidates = index.candidates("running", true);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].flag, "A");
    }

    #[test]
    fn empty_affix_rules_are_always_candidates() {
        let index = AffixIndex::build_suffix(vec![rule("A", ""), rule("B", "xyz")]);
        let candidates = index.candidates("anything", true);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].flag, "A");
    }

    #[test]
    fn prefix_index_keys_on_leading_characters() {
        let index = AffixIndex::build_prefix(vec![rule("U", "un")]);
        let candidates = index.candidates("undo", false);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].flag, "U");
        assert!(index.candidates("redo", false).is_empty());
    }
}
