//! The `SpellChecker` façade: configuration, the cached `check`/`suggest`
//! entry points, and session-scoped custom/ignore word management.

use std::collections::HashSet;

use tracing::instrument;

use crate::aff::{self, ParsedAff};
use crate::cache::{CacheStats, CheckCache, SuggestionCache};
use crate::dic::{self, ParsedDic};
use crate::dictionary::Dictionary;
use crate::error::SpellError;
use crate::suggest;

/// Configuration accepted by [`SpellChecker::new`].
///
/// The constructor requires exactly one of `(aff_text, dic_text)` or
/// `(parsed_aff, parsed_dic)`; supplying both pairs, or neither, fails with
/// [`SpellError::ConfigError`].
#[derive(Debug, Clone, Default)]
pub struct SpellCheckerConfig {
    /// Informational language tag (e.g. `"en_US"`); not otherwise consulted.
    pub language: String,
    /// Raw AFF source, to be parsed by the constructor.
    pub aff_text: Option<String>,
    /// Raw DIC source, to be parsed by the constructor.
    pub dic_text: Option<String>,
    /// An already-parsed AFF, bypassing AFF parsing.
    pub parsed_aff: Option<ParsedAff>,
    /// An already-parsed DIC, bypassing DIC parsing.
    pub parsed_dic: Option<ParsedDic>,
    /// Words accepted as correct for this session, beyond the dictionary.
    pub custom_words: Vec<String>,
    /// Words never reported as misspelled, also exempted by
    /// [`SpellChecker::should_ignore_word`].
    pub ignore_list: Vec<String>,
    /// When set, a capitalised word followed by all-lowercase letters is
    /// treated as a sentence-initial capitalisation and ignored.
    pub ignore_capitalized: bool,
    /// Words shorter than this (in characters) are never checked.
    pub min_word_length: usize,
    /// Maximum suggestions returned per misspelling.
    pub max_suggestions: usize,
}

/// A loaded dictionary plus its caches, ready to check text.
#[derive(Debug)]
pub struct SpellChecker {
    config: SpellCheckerConfig,
    dictionary: Dictionary,
    check_cache: CheckCache,
    suggestion_cache: SuggestionCache,
}

impl SpellChecker {
    /// Builds a checker from `config`, parsing AFF/DIC source text if given
    /// as raw strings.
    #[instrument(skip(config))]
    pub fn new(config: SpellCheckerConfig) -> Result<Self, SpellError> {
        let has_raw = config.aff_text.is_some() && config.dic_text.is_some();
        let has_parsed = config.parsed_aff.is_some() && config.parsed_dic.is_some();
        if has_raw == has_parsed {
            return Err(SpellError::ConfigError(
                "exactly one of (aff_text, dic_text) or (parsed_aff, parsed_dic) must be supplied".to_string(),
            ));
        }

        let (parsed_aff, parsed_dic) = if has_parsed {
            (config.parsed_aff.clone().expect("checked above"), config.parsed_dic.clone().expect("checked above"))
        } else {
            let aff_text = config.aff_text.as_deref().expect("checked above");
            let dic_text = config.dic_text.as_deref().expect("checked above");
            let parsed_aff = aff::parse(aff_text)?;
            let flag_type = parsed_aff.flag_type;
            let parsed_dic = dic::parse(dic_text, flag_type)?;
            (parsed_aff, parsed_dic)
        };

        let dictionary =
            Dictionary::new(parsed_aff, parsed_dic, config.custom_words.clone(), config.ignore_list.clone());

        Ok(SpellChecker { config, dictionary, check_cache: CheckCache::default(), suggestion_cache: SuggestionCache::default() })
    }

    pub(crate) fn config(&self) -> &SpellCheckerConfig {
        &self.config
    }

    pub(crate) fn dictionary_ignore_list(&self) -> &HashSet<String> {
        self.dictionary.ignore_list()
    }

    /// Whether `word` is spelled correctly, cached by lowercase word.
    #[instrument(skip(self))]
    pub fn check(&mut self, word: &str) -> bool {
        let key = word.to_lowercase();
        let dictionary = &self.dictionary;
        self.check_cache.get_or_compute(&key, || dictionary.has(word))
    }

    /// Up to `limit` suggested corrections for `word`, cached by
    /// `lower:limit`.
    #[instrument(skip(self))]
    pub fn suggest(&mut self, word: &str, limit: usize) -> Vec<String> {
        let key = format!("{}:{limit}", word.to_lowercase());
        let dictionary = &self.dictionary;
        self.suggestion_cache.get_or_compute(&key, || suggest::suggest(dictionary, word, limit))
    }

    /// Adds `word` to the session's custom word list and invalidates its
    /// check-cache entry.
    pub fn add_word(&mut self, word: &str) {
        self.dictionary.add_word(word.to_string());
        self.check_cache.invalidate(&word.to_lowercase());
    }

    /// Adds `word` to the session's ignore list and invalidates its
    /// check-cache entry.
    pub fn ignore_word(&mut self, word: &str) {
        self.dictionary.ignore_word(word.to_string());
        self.check_cache.invalidate(&word.to_lowercase());
    }

    /// Empties both caches and resets their hit/miss counters.
    pub fn clear_cache(&mut self) {
        self.check_cache.clear();
        self.suggestion_cache.clear();
    }

    /// Hit/miss counters for the check cache.
    pub fn check_cache_stats(&self) -> CacheStats {
        self.check_cache.stats
    }

    /// Hit/miss counters for the suggestion cache.
    pub fn suggestion_cache_stats(&self) -> CacheStats {
        self.suggestion_cache.stats
    }
}
