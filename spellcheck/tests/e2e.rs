//! End-to-end scenarios spanning AFF/DIC parsing, dictionary lookup,
//! suggestion generation, and the text-checking surface together.

use spellcheck::{SpellChecker, SpellCheckerConfig};

fn checker(aff: &str, dic: &str) -> SpellChecker {
    SpellChecker::new(SpellCheckerConfig {
        aff_text: Some(aff.to_string()),
        dic_text: Some(dic.to_string()),
        max_suggestions: 8,
        min_word_length: 1,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn dictionary_word_checks_true_and_typo_suggests_it() {
    let mut c = checker("TRY casro\n", "2\ncasa\ncarro\n");
    assert!(c.check("casa"));
    let suggestions = c.suggest("cssa", 8);
    assert_eq!(suggestions.first(), Some(&"casa".to_string()));
}

#[test]
fn affix_stripping_recognises_derived_forms_not_in_the_base_list() {
    let mut c = checker("SFX M Y 1\nSFX M 0 s [^sxz]\n", "1\ncat/M\n");
    assert!(c.check("cat"));
    assert!(c.check("cats"));
    assert!(!c.check("dogs"));
}

#[test]
fn check_text_reports_offsets_and_suggestions_for_each_misspelling() {
    let mut c = checker("TRY casro\n", "2\ncasa\ncarro\n");
    let result = c.check_text("casa is not cssa");
    assert_eq!(result.word_count, 4);
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.word, "cssa");
    assert_eq!(error.offset, "casa is not ".len());
    assert_eq!(error.suggestions.first(), Some(&"casa".to_string()));
}

#[test]
fn check_text_stream_defers_suggestions() {
    let mut c = checker("TRY casro\n", "2\ncasa\ncarro\n");
    let errors: Vec<_> = c.check_text_stream("cssa").collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].suggestions.is_empty());
}

#[test]
fn check_text_incremental_rechecks_only_the_expanded_window() {
    let mut c = checker("TRY casro\n", "2\ncasa\ncarro\n");
    let text = "casa casa cssa casa casa";
    let change_start = text.find("cssa").unwrap();
    let change_end = change_start + "cssa".len();
    let result = c.check_text_incremental(text, change_start, change_end);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].word, "cssa");
    assert_eq!(result.errors[0].offset, change_start);
}

#[test]
fn should_ignore_word_skips_short_shouting_and_digit_bearing_words() {
    let c = SpellChecker::new(SpellCheckerConfig {
        aff_text: Some(String::new()),
        dic_text: Some("1\ncasa\n".to_string()),
        max_suggestions: 8,
        min_word_length: 2,
        ..Default::default()
    })
    .unwrap();
    assert!(c.should_ignore_word("a"));
    assert!(c.should_ignore_word("OK"));
    assert!(c.should_ignore_word("v2"));
    assert!(!c.should_ignore_word("casa"));
}

#[test]
fn add_word_and_ignore_word_make_previously_unknown_words_check_true() {
    let mut c = checker("", "1\ncasa\n");
    assert!(!c.check("neologism"));
    c.add_word("neologism");
    assert!(c.check("neologism"));

    assert!(!c.check("xyzzy"));
    c.ignore_word("xyzzy");
    assert!(c.check("xyzzy"));
}

#[test]
fn config_without_either_source_pair_is_a_config_error() {
    let result = SpellChecker::new(SpellCheckerConfig::default());
    assert!(result.is_err());
}
