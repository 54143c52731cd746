//! Suggestion generation: four strategies run in fixed order, each scored,
//! deduplicated, and truncated to the caller's limit.

use std::collections::HashMap;

use tracing::instrument;

use crate::dictionary::Dictionary;

const VOWELS: &str = "aeiou";

const SCORE_REP: u32 = 100;
const SCORE_MAP: u32 = 90;
const SCORE_EDIT1: u32 = 80;
const SCORE_EDIT2: u32 = 60;

/// Generates up to `limit` suggestions for `word` (expected already
/// lowercase), running the four strategies in order and stopping early once
/// `2 * limit` accepted candidates have been collected.
#[instrument(skip(dictionary))]
pub(crate) fn suggest(dictionary: &Dictionary, word: &str, limit: usize) -> Vec<String> {
    let word = word.to_lowercase();
    let target = 2 * limit;
    let mut scored: HashMap<String, u32> = HashMap::new();

    accept_rep_rules(dictionary, &word, &mut scored);
    if scored.len() < target {
        accept_character_map(dictionary, &word, &mut scored);
    }
    if scored.len() < target {
        accept_edit_distance_one(dictionary, &word, &mut scored, target);
    }
    if scored.len() < target {
        accept_edit_distance_two(dictionary, &word, &mut scored, target);
    }

    let mut ranked: Vec<(String, u32)> = scored
        .into_iter()
        .filter(|(candidate, _)| !dictionary.should_not_suggest(candidate))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}

fn accept(dictionary: &Dictionary, scored: &mut HashMap<String, u32>, candidate: String, score: u32) {
    if dictionary.has(&candidate) {
        scored.entry(candidate).or_insert(score);
    }
}

fn accept_rep_rules(dictionary: &Dictionary, word: &str, scored: &mut HashMap<String, u32>) {
    for (from, to) in &dictionary.aff().rep_rules {
        if !word.contains(from.as_str()) {
            continue;
        }
        let first_only = word.replacen(from.as_str(), to, 1);
        accept(dictionary, scored, first_only.clone(), SCORE_REP);
        let all = word.replace(from.as_str(), to);
        if all != first_only {
            accept(dictionary, scored, all, SCORE_REP);
        }
    }
}

fn accept_character_map(dictionary: &Dictionary, word: &str, scored: &mut HashMap<String, u32>) {
    let chars: Vec<char> = word.chars().collect();
    for group in &dictionary.aff().map_groups {
        let group_chars: Vec<char> = group.chars().collect();
        for (position, &current) in chars.iter().enumerate() {
            if !group_chars.contains(&current) {
                continue;
            }
            for &replacement in &group_chars {
                if replacement == current {
                    continue;
                }
                let mut candidate_chars = chars.clone();
                candidate_chars[position] = replacement;
                accept(dictionary, scored, candidate_chars.into_iter().collect(), SCORE_MAP);
            }
        }
    }
}

fn accept_edit_distance_one(dictionary: &Dictionary, word: &str, scored: &mut HashMap<String, u32>, target: usize) {
    for candidate in edit_distance_one(word, &dictionary.aff().try_chars) {
        if scored.len() >= target {
            return;
        }
        accept(dictionary, scored, candidate, SCORE_EDIT1);
    }
}

fn accept_edit_distance_two(dictionary: &Dictionary, word: &str, scored: &mut HashMap<String, u32>, target: usize) {
    let first_round = edit_distance_one(word, &dictionary.aff().try_chars);
    for candidate in first_round.into_iter().take(100) {
        if scored.len() >= target {
            return;
        }
        for second in edit_distance_one(&candidate, VOWELS) {
            if scored.len() >= target {
                return;
            }
            if scored.contains_key(&second) {
                continue;
            }
            accept(dictionary, scored, second, SCORE_EDIT2);
        }
    }
}

/// Deletions, adjacent transpositions, replacements (using every char in
/// `alphabet` other than the current one), and insertions (using every char
/// in `alphabet`) — the classic single-edit neighbourhood, scoped to one
/// source alphabet.
fn edit_distance_one(word: &str, alphabet: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let alphabet: Vec<char> = alphabet.chars().collect();
    let mut candidates = Vec::new();

    for i in 0..chars.len() {
        let mut deleted = chars.clone();
        deleted.remove(i);
        candidates.push(deleted.into_iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut swapped = chars.clone();
        swapped.swap(i, i + 1);
        candidates.push(swapped.into_iter().collect());
    }

    for i in 0..chars.len() {
        for &c in &alphabet {
            if c == chars[i] {
                continue;
            }
            let mut replaced = chars.clone();
            replaced[i] = c;
            candidates.push(replaced.into_iter().collect());
        }
    }

    for i in 0..=chars.len() {
        for &c in &alphabet {
            let mut inserted = chars.clone();
            inserted.insert(i, c);
            candidates.push(inserted.into_iter().collect());
        }
    }

    candidates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aff;
    use crate::dic;
    use crate::dictionary::Dictionary;

    fn build(aff_src: &str, dic_src: &str) -> Dictionary {
        let parsed_aff = aff::parse(aff_src).unwrap();
        let flag_type = parsed_aff.flag_type;
        let parsed_dic = dic::parse(dic_src, flag_type).unwrap();
        Dictionary::new(parsed_aff, parsed_dic, Vec::new(), Vec::new())
    }

    #[test]
    fn edit_distance_one_suggests_replacement_over_typo() {
        let dict = build("TRY casro\n", "2\ncasa\ncarro\n");
        let suggestions = suggest(&dict, "cssa", 8);
        assert_eq!(suggestions.first(), Some(&"casa".to_string()));
    }

    #[test]
    fn rep_rule_candidates_outrank_edit_distance_candidates() {
        let dict = build("REP 1\nREP f ph\nTRY abcdefghijklmnopqrstuvwxyz\n", "1\nphone\n");
        let suggestions = suggest(&dict, "fone", 8);
        assert_eq!(suggestions.first(), Some(&"phone".to_string()));
    }

    #[test]
    fn character_map_finds_accented_variant() {
        let dict = build("MAP 1\nMAP eé\n", "1\ncafé\n");
        let suggestions = suggest(&dict, "cafe", 8);
        assert!(suggestions.contains(&"café".to_string()));
    }

    #[test]
    fn nosuggest_flagged_words_are_filtered_out() {
        let dict = build("NOSUGGEST N\nTRY abc\n", "2\ncasa\ncasb/N\n");
        let suggestions = suggest(&dict, "casc", 8);
        assert!(!suggestions.contains(&"casb".to_string()));
    }

    #[test]
    fn suggestions_are_capped_at_the_requested_limit() {
        let dict = build("TRY abcdefghijklmnopqrstuvwxyz\n", "3\naaa\naab\naac\n");
        let suggestions = suggest(&dict, "aad", 2);
        assert_eq!(suggestions.len(), 2);
    }
}
