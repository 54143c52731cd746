//! DIC (dictionary) parsing: a base word list with optional affix flags.

use std::collections::HashMap;

use tracing::instrument;

use crate::error::SpellError;
use crate::flags::{split_flags, FlagType};

/// A parsed `.dic` source: each word mapped to the flags attached to it.
#[derive(Debug, Clone, Default)]
pub struct ParsedDic {
    /// `word → flags`, in the encoding implied by the AFF's `FLAG` directive.
    pub entries: HashMap<String, Vec<String>>,
}

/// Parses DIC source text. The first non-empty line is an advisory word
/// count and is not otherwise validated against the number of lines that
/// follow.
#[instrument(skip(text))]
pub fn parse(text: &str, flag_type: FlagType) -> Result<ParsedDic, SpellError> {
    let mut entries = HashMap::new();
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    lines.next(); // advisory count

    for line in lines {
        let (word, flag_string) = match line.split_once('/') {
            Some((word, flags)) => (word, flags),
            None => (line, ""),
        };
        if word.is_empty() {
            continue;
        }
        entries.insert(word.to_string(), split_flags(flag_type, flag_string));
    }

    Ok(ParsedDic { entries })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_words_with_and_without_flags() {
        let dic = parse("3\ncasa/MS\ncarro\nniño/MS\n", FlagType::Ascii).unwrap();
        assert_eq!(dic.entries.get("casa").unwrap(), &vec!["M".to_string(), "S".to_string()]);
        assert!(dic.entries.get("carro").unwrap().is_empty());
        assert_eq!(dic.entries.get("niño").unwrap(), &vec!["M".to_string(), "S".to_string()]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dic = parse("2\n\ncasa\n\ncarro\n", FlagType::Ascii).unwrap();
        assert_eq!(dic.entries.len(), 2);
    }

    #[test]
    fn long_flag_type_splits_flag_string_in_pairs() {
        let dic = parse("1\nrun/AABB\n", FlagType::Long).unwrap();
        assert_eq!(dic.entries.get("run").unwrap(), &vec!["AA".to_string(), "BB".to_string()]);
    }
}
