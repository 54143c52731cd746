//! Flag representation and flag-string splitting.
//!
//! Hunspell affix files choose one of four textual encodings for flag
//! identifiers up front (the `FLAG` directive); every flag string in the rest
//! of the AFF/DIC source is written in that encoding.

use crate::error::SpellError;

/// How individual flags are packed into a flag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagType {
    /// One ASCII character per flag (the Hunspell default).
    #[default]
    Ascii,
    /// One Unicode character per flag.
    Utf8,
    /// Flags are two-character pairs.
    Long,
    /// Flags are decimal numbers separated by commas.
    Num,
}

pub(crate) fn parse_flag_type(token: &str) -> Result<FlagType, SpellError> {
    match token {
        "ASCII" => Ok(FlagType::Ascii),
        "UTF-8" => Ok(FlagType::Utf8),
        "long" => Ok(FlagType::Long),
        "num" => Ok(FlagType::Num),
        other => Err(SpellError::InvalidInput(format!("unknown FLAG type {other:?}"))),
    }
}

/// Splits a flag string (the part after `word/` in a DIC line, or a
/// directive's flag token) into individual flags per `flag_type`.
pub(crate) fn split_flags(flag_type: FlagType, raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    match flag_type {
        FlagType::Ascii | FlagType::Utf8 => raw.chars().map(|c| c.to_string()).collect(),
        FlagType::Long => {
            let chars: Vec<char> = raw.chars().collect();
            chars.chunks(2).map(|pair| pair.iter().collect()).collect()
        }
        FlagType::Num => raw.split(',').map(|s| s.trim().to_string()).collect(),
    }
}
