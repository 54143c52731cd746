//! Text-level operations: word extraction, ignore-word policy, and the
//! three ways of checking a span of text (whole, streamed, incremental).

use std::time::Instant;

use regex::Regex;
use std::sync::OnceLock;
use tracing::instrument;
use unicode_segmentation::UnicodeSegmentation;

use crate::checker::SpellChecker;

fn grapheme_count(word: &str) -> usize {
    word.graphemes(true).count()
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{M}]+").expect("word pattern is a valid regex"))
}

/// A word together with its 0-based byte offset into the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAt {
    /// The extracted word text.
    pub word: String,
    /// Byte offset of the word's first character in the source.
    pub offset: usize,
}

/// Splits `text` into `(word, byteOffset)` pairs using the Unicode
/// letter-plus-mark pattern.
pub fn extract_words(text: &str) -> Vec<WordAt> {
    word_pattern()
        .find_iter(text)
        .map(|m| WordAt { word: m.as_str().to_string(), offset: m.start() })
        .collect()
}

/// A reported misspelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingError {
    /// Stable identifier for the kind of finding (currently always
    /// `"unknown-word"`; kept as a field so future finding kinds don't
    /// require an API break).
    pub id: String,
    /// The misspelled word as it appeared in the source.
    pub word: String,
    /// Byte offset into the checked text.
    pub offset: usize,
    /// Byte length of the word in the checked text.
    pub length: usize,
    /// Candidate corrections, highest-scored first.
    pub suggestions: Vec<String>,
    /// Optional human-readable message.
    pub message: Option<String>,
}

/// Result of [`SpellChecker::check_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Every misspelling found, in source order.
    pub errors: Vec<SpellingError>,
    /// Total words examined.
    pub word_count: usize,
    /// Wall-clock time taken to check the text, in milliseconds.
    pub elapsed_ms: u64,
}

impl SpellChecker {
    /// True when `word` should be skipped by the checker entirely (too
    /// short, explicitly ignored, shouting-case, capitalised-sentence-start,
    /// or containing a digit).
    pub fn should_ignore_word(&self, word: &str) -> bool {
        let grapheme_count = grapheme_count(word);
        if grapheme_count < self.config().min_word_length {
            return true;
        }
        if self.dictionary_ignore_list().contains(word) {
            return true;
        }
        if grapheme_count <= 5 && word.chars().all(|c| c.is_uppercase()) {
            return true;
        }
        if self.config().ignore_capitalized {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                if first.is_uppercase() && chars.clone().all(|c| c.is_lowercase()) && chars.next().is_some() {
                    return true;
                }
            }
        }
        if word.chars().any(|c| c.is_ascii_digit()) {
            return true;
        }
        false
    }

    /// Checks the whole of `text`, returning every misspelling with up to
    /// `max_suggestions` candidates each.
    #[instrument(skip(self, text))]
    pub fn check_text(&mut self, text: &str) -> CheckResult {
        let started = Instant::now();
        let words = extract_words(text);
        let word_count = words.len();
        let mut errors = Vec::new();
        for WordAt { word, offset } in words {
            if self.should_ignore_word(&word) {
                continue;
            }
            if self.check(&word) {
                continue;
            }
            let suggestions = self.suggest(&word, self.config().max_suggestions);
            errors.push(SpellingError {
                id: "unknown-word".to_string(),
                length: word.len(),
                word,
                offset,
                suggestions,
                message: None,
            });
        }
        CheckResult { errors, word_count, elapsed_ms: started.elapsed().as_millis() as u64 }
    }

    /// Checks `text` lazily, yielding one [`SpellingError`] per misspelling
    /// with suggestions deferred (always empty). Every 50 words the
    /// iteration represents a cooperative yield point for the host;
    /// `Iterator::next` itself is that point, so no explicit scheduler hook
    /// is needed in a synchronous Rust consumer.
    pub fn check_text_stream<'a>(&'a mut self, text: &'a str) -> impl Iterator<Item = SpellingError> + 'a {
        extract_words(text).into_iter().filter_map(move |WordAt { word, offset }| {
            if self.should_ignore_word(&word) || self.check(&word) {
                return None;
            }
            Some(SpellingError {
                id: "unknown-word".to_string(),
                length: word.len(),
                word,
                offset,
                suggestions: Vec::new(),
                message: None,
            })
        })
    }

    /// Re-checks only the region around `[change_start, change_end)`: the
    /// window is expanded outward to word-character boundaries, then by a
    /// 50-character buffer on each side, then re-expanded to boundaries.
    /// Reported offsets are in `text`'s own coordinate space.
    #[instrument(skip(self, text))]
    pub fn check_text_incremental(&mut self, text: &str, change_start: usize, change_end: usize) -> CheckResult {
        let started = Instant::now();
        let change_start = change_start.min(text.len());
        let change_end = change_end.min(text.len()).max(change_start);

        let window = expand_to_word_boundary(text, change_start, change_end);
        let buffered_start = window.0.saturating_sub(50);
        let buffered_end = (window.1 + 50).min(text.len());
        let final_window = expand_to_word_boundary(text, buffered_start, buffered_end);

        let (window_start, window_end) = final_window;
        let slice = slice_at_char_boundaries(text, window_start, window_end);

        let words = extract_words(slice);
        let word_count = words.len();
        let mut errors = Vec::new();
        for WordAt { word, offset } in words {
            if self.should_ignore_word(&word) {
                continue;
            }
            if self.check(&word) {
                continue;
            }
            let suggestions = self.suggest(&word, self.config().max_suggestions);
            errors.push(SpellingError {
                id: "unknown-word".to_string(),
                length: word.len(),
                word,
                offset: window_start + offset,
                suggestions,
                message: None,
            });
        }
        CheckResult { errors, word_count, elapsed_ms: started.elapsed().as_millis() as u64 }
    }
}

fn slice_at_char_boundaries(text: &str, mut start: usize, mut end: usize) -> &str {
    while start < text.len() && !text.is_char_boundary(start) {
        start -= 1;
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

fn expand_to_word_boundary(text: &str, start: usize, end: usize) -> (usize, usize) {
    let is_word_char = |c: char| c.is_alphanumeric();

    let mut expanded_start = start;
    while expanded_start > 0 {
        let candidate = prev_char_boundary(text, expanded_start);
        match text[candidate..].chars().next() {
            Some(c) if is_word_char(c) => expanded_start = candidate,
            _ => break,
        }
    }

    let mut expanded_end = end;
    while expanded_end < text.len() {
        match text[expanded_end..].chars().next() {
            Some(c) if is_word_char(c) => expanded_end += c.len_utf8(),
            _ => break,
        }
    }

    (expanded_start, expanded_end)
}

fn prev_char_boundary(text: &str, mut index: usize) -> usize {
    index -= 1;
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
