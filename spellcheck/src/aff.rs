//! AFF (affix file) parsing: the directive grammar, flag-bearing prefix and
//! suffix rules, and condition-pattern compilation.

use std::collections::HashMap;

use regex::Regex;
use tracing::instrument;

use crate::error::SpellError;
use crate::flags::{parse_flag_type, FlagType};

/// Which end of the stem a rule's condition pattern anchors against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Prefix rule: condition matches the start of the stem.
    Start,
    /// Suffix rule: condition matches the end of the stem.
    End,
}

/// A single `PFX`/`SFX` rule line.
#[derive(Debug, Clone)]
pub struct AffixRule {
    /// The flag this rule is filed under.
    pub flag: String,
    /// Whether the rule may combine with an affix from the opposite side
    /// (the `Y`/`N` column of the rule's header). Not consulted by the
    /// lookup or suggestion algorithms, which only ever strip one affix at
    /// a time; kept for fidelity with the Hunspell rule shape.
    pub cross_product: bool,
    /// Characters removed from the stem before the affix is attached
    /// (empty when the header used `0`).
    pub strip: String,
    /// Characters added to the stem (empty when the header used `0`).
    pub affix: String,
    /// Compiled condition the stem must satisfy, if any.
    pub condition: Option<Regex>,
}

/// A parsed `.aff` source.
#[derive(Debug, Clone, Default)]
pub struct ParsedAff {
    /// Declared `SET` encoding (informational; input is always treated as
    /// already-decoded UTF-8 text).
    pub encoding: String,
    /// Declared `FLAG` representation.
    pub flag_type: FlagType,
    /// `TRY` character set, used for edit-distance suggestion generation.
    pub try_chars: String,
    /// `MAP` equivalence groups, each a string of mutually-substitutable
    /// characters.
    pub map_groups: Vec<String>,
    /// `REP` replacement rules, `(from, to)`.
    pub rep_rules: Vec<(String, String)>,
    /// `PFX` rules grouped by flag.
    pub prefix_rules: HashMap<String, Vec<AffixRule>>,
    /// `SFX` rules grouped by flag.
    pub suffix_rules: HashMap<String, Vec<AffixRule>>,
    /// `FORBIDDENWORD` flag, if declared.
    pub forbidden_flag: Option<String>,
    /// `NOSUGGEST` flag, if declared.
    pub nosuggest_flag: Option<String>,
    /// `BREAK` word-splitting patterns (recorded but not consulted by the
    /// lookup/suggestion pipeline, which operates on already-tokenised
    /// words).
    pub break_patterns: Vec<String>,
}

/// Parses AFF source text into a [`ParsedAff`].
#[instrument(skip(text))]
pub fn parse(text: &str) -> Result<ParsedAff, SpellError> {
    let mut aff = ParsedAff::default();
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(directive) = parts.next() else { continue };
        match directive {
            "SET" => {
                if let Some(enc) = parts.next() {
                    aff.encoding = enc.to_string();
                }
            }
            "FLAG" => {
                if let Some(token) = parts.next() {
                    aff.flag_type = parse_flag_type(token)?;
                }
            }
            "TRY" => {
                if let Some(chars) = parts.next() {
                    aff.try_chars = chars.to_string();
                }
            }
            "MAP" => {
                if let Some(rest) = parts.next() {
                    if !is_count_only(rest) {
                        aff.map_groups.push(rest.to_string());
                    }
                }
            }
            "REP" => {
                let from = parts.next();
                let to = parts.next();
                match (from, to) {
                    (Some(f), Some(t)) => {
                        aff.rep_rules.push((decode_underscores(f), decode_underscores(t)));
                    }
                    (Some(f), None) if is_count_only(f) => {}
                    _ => {}
                }
            }
            "BREAK" => {
                if let Some(pattern) = parts.next() {
                    aff.break_patterns.push(pattern.to_string());
                }
            }
            "FORBIDDENWORD" => {
                aff.forbidden_flag = parts.next().map(str::to_string);
            }
            "NOSUGGEST" => {
                aff.nosuggest_flag = parts.next().map(str::to_string);
            }
            "PFX" | "SFX" => {
                let flag = parts
                    .next()
                    .ok_or_else(|| SpellError::InvalidInput(format!("{directive} missing flag")))?
                    .to_string();
                let cross_product = parts.next().is_some_and(|token| token == "Y");
                let count: usize = parts
                    .next()
                    .and_then(|token| token.parse().ok())
                    .ok_or_else(|| SpellError::InvalidInput(format!("{directive} {flag} missing rule count")))?;
                let anchor = if directive == "PFX" { Anchor::Start } else { Anchor::End };
                for _ in 0..count {
                    let Some(rule_line) = lines.get(i) else {
                        return Err(SpellError::InvalidInput(format!(
                            "{directive} {flag} declared {count} rules but ran out of input"
                        )));
                    };
                    i += 1;
                    let rule = parse_rule_line(rule_line, &flag, cross_product, anchor)?;
                    let bucket = if directive == "PFX" { &mut aff.prefix_rules } else { &mut aff.suffix_rules };
                    bucket.entry(flag.clone()).or_default().push(rule);
                }
            }
            _ => {}
        }
    }
    Ok(aff)
}

fn is_count_only(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn decode_underscores(token: &str) -> String {
    token.replace('_', " ")
}

fn parse_rule_line(line: &str, flag: &str, cross_product: bool, anchor: Anchor) -> Result<AffixRule, SpellError> {
    let mut parts = line.trim().split_whitespace();
    let _directive = parts.next();
    let _flag = parts.next();
    let strip_tok = parts
        .next()
        .ok_or_else(|| SpellError::InvalidInput(format!("affix rule for flag {flag} missing strip column")))?;
    let affix_tok = parts
        .next()
        .ok_or_else(|| SpellError::InvalidInput(format!("affix rule for flag {flag} missing affix column")))?;
    let cond_tok = parts.next();

    let strip = if strip_tok == "0" { String::new() } else { strip_tok.to_string() };
    let affix = if affix_tok == "0" { String::new() } else { affix_tok.to_string() };
    let condition = match cond_tok {
        None | Some(".") => None,
        Some(pattern) => Some(compile_condition(pattern, anchor)?),
    };
    Ok(AffixRule { flag: flag.to_string(), cross_product, strip, affix, condition })
}

/// Compiles a Hunspell condition pattern (`.`, `[abc]`/`[^abc]`, literal
/// characters) into an anchored regex matching the stem.
pub(crate) fn compile_condition(pattern: &str, anchor: Anchor) -> Result<Regex, SpellError> {
    let mut out = String::new();
    if anchor == Anchor::Start {
        out.push('^');
    }
    let chars: Vec<char> = pattern.chars().collect();
    let mut idx = 0;
    while idx < chars.len() {
        match chars[idx] {
            '.' => {
                out.push('.');
                idx += 1;
            }
            '[' => {
                out.push('[');
                idx += 1;
                while idx < chars.len() && chars[idx] != ']' {
                    out.push(chars[idx]);
                    idx += 1;
                }
                if idx < chars.len() {
                    out.push(']');
                    idx += 1;
                }
            }
            c @ ('$' | '(' | ')' | '*' | '+' | '?' | '\\' | '{' | '}' | '|') => {
                out.push('\\');
                out.push(c);
                idx += 1;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                idx += 1;
            }
        }
    }
    if anchor == Anchor::End {
        out.push('$');
    }
    Regex::new(&out).map_err(|e| SpellError::InvalidInput(format!("invalid condition pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_set_flag_try_and_map_directives() {
        let aff = parse("SET UTF-8\nFLAG long\nTRY esianrtolcdu\nMAP 2\nMAP aá\nMAP eé\n").unwrap();
        assert_eq!(aff.encoding, "UTF-8");
        assert_eq!(aff.flag_type, FlagType::Long);
        assert_eq!(aff.try_chars, "esianrtolcdu");
        assert_eq!(aff.map_groups, vec!["aá".to_string(), "eé".to_string()]);
    }

    #[test]
    fn parses_rep_rules_decoding_underscores_as_spaces() {
        let aff = parse("REP 1\nREP a_b c_d\n").unwrap();
        assert_eq!(aff.rep_rules, vec![("a b".to_string(), "c d".to_string())]);
    }

    #[test]
    fn parses_sfx_block_with_condition() {
        let aff = parse("SFX M Y 1\nSFX M 0 s [^sxz]\n").unwrap();
        let rules = aff.suffix_rules.get("M").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].affix, "s");
        assert!(rules[0].strip.is_empty());
        assert!(rules[0].cross_product);
        let condition = rules[0].condition.as_ref().unwrap();
        assert!(condition.is_match("cat"));
        assert!(!condition.is_match("box"));
    }

    #[test]
    fn parses_pfx_block_with_strip() {
        let aff = parse("PFX U N 1\nPFX U y 0 y\n").unwrap();
        let rules = aff.prefix_rules.get("U").unwrap();
        assert_eq!(rules[0].strip, "y");
        assert!(rules[0].affix.is_empty());
        assert!(!rules[0].cross_product);
    }

    #[test]
    fn forbiddenword_and_nosuggest_flags_are_recorded() {
        let aff = parse("FORBIDDENWORD F\nNOSUGGEST N\n").unwrap();
        assert_eq!(aff.forbidden_flag.as_deref(), Some("F"));
        assert_eq!(aff.nosuggest_flag.as_deref(), Some("N"));
    }

    #[test]
    fn unrecognised_directives_are_ignored() {
        let aff = parse("WORDCHARS abc\nCOMPLEXPREFIXES\n").unwrap();
        assert!(aff.prefix_rules.is_empty());
        assert!(aff.suffix_rules.is_empty());
    }

    #[test]
    fn condition_dot_and_class_compile_to_equivalent_regex_forms() {
        let any = compile_condition(".", Anchor::End).unwrap();
        assert!(any.is_match("x"));
        let class = compile_condition("[aeiou]", Anchor::End).unwrap();
        assert!(class.is_match("sofa"));
        assert!(!class.is_match("sofb"));
    }

    #[test]
    fn condition_escapes_regex_metacharacters_in_literal_text() {
        let condition = compile_condition("a+b", Anchor::End).unwrap();
        assert!(condition.is_match("ca+b"));
        assert!(!condition.is_match("caaab"));
    }
}
