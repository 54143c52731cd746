//! The loaded dictionary: base word table, affix indices, and the `has`
//! lookup chain (custom list → ignore list → exact table → lowercase
//! variant → affix stripping).

use std::collections::HashSet;

use tracing::instrument;

use crate::aff::ParsedAff;
use crate::dic::ParsedDic;
use crate::index::AffixIndex;

#[derive(Debug)]
pub(crate) struct Dictionary {
    aff: ParsedAff,
    dic: ParsedDic,
    suffix_index: AffixIndex,
    prefix_index: AffixIndex,
    custom_words: HashSet<String>,
    ignore_list: HashSet<String>,
}

impl Dictionary {
    pub(crate) fn new(aff: ParsedAff, dic: ParsedDic, custom_words: Vec<String>, ignore_list: Vec<String>) -> Self {
        let suffix_rules: Vec<_> = aff.suffix_rules.values().flatten().cloned().collect();
        let prefix_rules: Vec<_> = aff.prefix_rules.values().flatten().cloned().collect();
        Dictionary {
            aff,
            dic,
            suffix_index: AffixIndex::build_suffix(suffix_rules),
            prefix_index: AffixIndex::build_prefix(prefix_rules),
            custom_words: custom_words.into_iter().collect(),
            ignore_list: ignore_list.into_iter().collect(),
        }
    }

    pub(crate) fn aff(&self) -> &ParsedAff {
        &self.aff
    }

    pub(crate) fn add_word(&mut self, word: String) {
        self.custom_words.insert(word);
    }

    pub(crate) fn ignore_word(&mut self, word: String) {
        self.ignore_list.insert(word);
    }

    pub(crate) fn ignore_list(&self) -> &HashSet<String> {
        &self.ignore_list
    }

    /// The `has(word)` lookup chain.
    #[instrument(skip(self))]
    pub(crate) fn has(&self, word: &str) -> bool {
        if self.custom_words.contains(word) {
            return true;
        }
        if self.ignore_list.contains(word) {
            return true;
        }
        if let Some(flags) = self.dic.entries.get(word) {
            return !self.is_forbidden(flags);
        }
        let lower = word.to_lowercase();
        if lower != word && self.dic.entries.contains_key(&lower) {
            return true;
        }
        if self.strip_suffix(word).is_some() {
            return true;
        }
        if self.strip_prefix(word).is_some() {
            return true;
        }
        if lower != word && self.strip_suffix(&lower).is_some() {
            return true;
        }
        false
    }

    /// True when `word` is present (exact or lowercase) and carries the
    /// `NOSUGGEST` flag; used to filter suggestion candidates.
    pub(crate) fn should_not_suggest(&self, word: &str) -> bool {
        let Some(flag) = &self.aff.nosuggest_flag else { return false };
        self.word_has_flag(word, flag)
    }

    fn is_forbidden(&self, flags: &[String]) -> bool {
        self.aff.forbidden_flag.as_ref().is_some_and(|flag| flags.iter().any(|f| f == flag))
    }

    fn word_has_flag(&self, word: &str, flag: &str) -> bool {
        let exact = self.dic.entries.get(word);
        let lower_key = word.to_lowercase();
        let entry = exact.or_else(|| self.dic.entries.get(&lower_key));
        entry.is_some_and(|flags| flags.iter().any(|f| f == flag))
    }

    fn strip_suffix(&self, word: &str) -> Option<String> {
        for rule in self.suffix_index.candidates(word, true) {
            if !rule.affix.is_empty() && !word.ends_with(rule.affix.as_str()) {
                continue;
            }
            let stem_end = word.len() - rule.affix.len();
            let stem = format!("{}{}", &word[..stem_end], rule.strip);
            let Some(flags) = self.dic.entries.get(&stem) else { continue };
            if !flags.iter().any(|f| f == &rule.flag) {
                continue;
            }
            if let Some(condition) = &rule.condition {
                if !condition.is_match(&stem) {
                    continue;
                }
            }
            return Some(stem);
        }
        None
    }

    fn strip_prefix(&self, word: &str) -> Option<String> {
        for rule in self.prefix_index.candidates(word, false) {
            if !rule.affix.is_empty() && !word.starts_with(rule.affix.as_str()) {
                continue;
            }
            let stem = format!("{}{}", rule.strip, &word[rule.affix.len()..]);
            let Some(flags) = self.dic.entries.get(&stem) else { continue };
            if !flags.iter().any(|f| f == &rule.flag) {
                continue;
            }
            if let Some(condition) = &rule.condition {
                if !condition.is_match(&stem) {
                    continue;
                }
            }
            return Some(stem);
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aff;
    use crate::dic;

    fn build(aff_src: &str, dic_src: &str) -> Dictionary {
        let parsed_aff = aff::parse(aff_src).unwrap();
        let flag_type = parsed_aff.flag_type;
        let parsed_dic = dic::parse(dic_src, flag_type).unwrap();
        Dictionary::new(parsed_aff, parsed_dic, Vec::new(), Vec::new())
    }

    #[test]
    fn base_dictionary_words_are_found() {
        let dict = build("", "2\ncasa\ncarro\n");
        assert!(dict.has("casa"));
        assert!(dict.has("carro"));
        assert!(!dict.has("perro"));
    }

    #[test]
    fn suffix_stripping_accepts_derived_forms() {
        let dict = build("SFX M Y 1\nSFX M 0 s [^sxz]\n", "1\ncat/M\n");
        assert!(dict.has("cats"));
        assert!(!dict.has("dogs"));
    }

    #[test]
    fn prefix_stripping_accepts_derived_forms() {
        let dict = build("PFX U Y 1\nPFX U 0 un .\n", "1\ndo/U\n");
        assert!(dict.has("undo"));
    }

    #[test]
    fn forbidden_flag_rejects_exact_match() {
        let dict = build("FORBIDDENWORD F\n", "1\nbadword/F\n");
        assert!(!dict.has("badword"));
    }

    #[test]
    fn custom_words_and_ignore_list_are_fast_paths() {
        let mut dict = build("", "1\ncasa\n");
        assert!(!dict.has("neologism"));
        dict.add_word("neologism".to_string());
        assert!(dict.has("neologism"));
        dict.ignore_word("typoword".to_string());
        assert!(dict.has("typoword"));
    }

    #[test]
    fn nosuggest_flag_is_detected_via_shared_flag_helper() {
        let dict = build("NOSUGGEST N\n", "1\ncurse/N\n");
        assert!(dict.should_not_suggest("curse"));
        assert!(!dict.should_not_suggest("casa"));
    }
}
