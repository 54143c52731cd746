//! A hand-rolled, allocation-light character scanner shared by the tree
//! parser and the streaming (SAX) variant. Tracks line/column/byte offset so
//! every [`XmlError`] can point at the exact source location.

use crate::dom::NamespaceDecl;
use crate::error::{Position, XmlError};

/// A parsed, not-yet-namespace-resolved attribute: `(prefix, local_name,
/// value)`.
pub(crate) type RawAttr = (Option<String>, String, String);

/// Scans a `&str` input, tracking position as it goes.
pub(crate) struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Scanner { input, bytes: input.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub(crate) fn position(&self) -> Position {
        Position { line: self.line, column: self.column, byte_offset: self.pos }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError::new(self.position(), message)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Advances past one char, updating line/column bookkeeping.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advances past `literal` if the input starts with it exactly.
    pub(crate) fn consume_literal(&mut self, literal: &str) -> bool {
        if self.starts_with(literal) {
            for _ in literal.chars() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Reads everything up to (not including) the next occurrence of
    /// `terminator`, erroring at EOF if it is never found.
    pub(crate) fn read_until(&mut self, terminator: &str) -> Result<String, XmlError> {
        let start = self.pos;
        while !self.is_eof() {
            if self.starts_with(terminator) {
                return Ok(self.input[start..self.pos].to_string());
            }
            self.advance();
        }
        Err(self.error(format!("unexpected end of input, expected {terminator:?}")))
    }

    /// Reads an XML `Name` production (simplified: ASCII letters/digits,
    /// `_`, `-`, `.`, `:`, plus any non-ASCII alphabetic/mark char).
    pub(crate) fn read_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_name_start_char(c) => {
                self.advance();
            }
            _ => return Err(self.error("expected a name, got illegal name-start character")),
        }
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        Ok(self.input[start..self.pos].to_string())
    }
}

/// Approximation of XML 1.0's `NameStartChar`: ASCII letters, `_`, `:`, or
/// any non-ASCII alphabetic character.
pub(crate) fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || (!c.is_ascii() && c.is_alphabetic())
}

/// Approximation of XML 1.0's `NameChar`: `NameStartChar` plus digits, `-`,
/// `.`, combining marks, and the middle dot.
pub(crate) fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || c.is_ascii_digit()
        || c == '-'
        || c == '.'
        || c == '\u{B7}'
        || (!c.is_ascii() && (c.is_alphanumeric() || is_mark_like(c)))
}

/// Crude "is this a combining mark" check without pulling in a Unicode data
/// crate: treats any char in the common combining-diacritic Unicode block
/// ranges as a mark. Full conformance to every `CombiningChar` codepoint in
/// the XML 1.0 production is not attempted.
fn is_mark_like(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF)
}

/// Decodes predefined and numeric character references (`&amp; &#65;
/// &#x41;`). Unrecognized named entities (e.g. `&copy;`) are left
/// untouched verbatim rather than expanded or rejected.
pub(crate) fn decode_entities(input: &str, pos: &Position) -> Result<String, XmlError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        let rest = &input[i..];
        let end = rest.find(';').ok_or_else(|| {
            XmlError::new(*pos, "unterminated character or entity reference")
        })?;
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                let code = u32::from_str_radix(&entity[2..], 16)
                    .map_err(|_| XmlError::new(*pos, format!("invalid hex character reference &{entity};")))?;
                char::from_u32(code)
                    .ok_or_else(|| XmlError::new(*pos, format!("invalid codepoint &{entity};")))?
            }
            _ if entity.starts_with('#') => {
                let code = entity[1..]
                    .parse::<u32>()
                    .map_err(|_| XmlError::new(*pos, format!("invalid decimal character reference &{entity};")))?;
                char::from_u32(code)
                    .ok_or_else(|| XmlError::new(*pos, format!("invalid codepoint &{entity};")))?
            }
            _ => {
                out.push('&');
                out.push_str(entity);
                out.push(';');
                for _ in 0..entity.chars().count() + 1 {
                    chars.next();
                }
                continue;
            }
        };
        out.push(decoded);
        for _ in 0..entity.chars().count() + 1 {
            chars.next();
        }
    }
    Ok(out)
}

/// Splits a qualified name into `(prefix, local_name)`.
pub(crate) fn split_qname(qname: &str) -> (Option<String>, String) {
    match qname.split_once(':') {
        Some((p, l)) => (Some(p.to_string()), l.to_string()),
        None => (None, qname.to_string()),
    }
}

/// Reads a single-or-double-quoted, entity-decoded value, e.g. an
/// attribute's value or an XML-declaration pseudo-attribute's value.
pub(crate) fn read_quoted_value(scanner: &mut Scanner<'_>) -> Result<String, XmlError> {
    let quote = match scanner.advance() {
        Some(c @ ('"' | '\'')) => c,
        _ => return Err(scanner.error("expected a quoted value")),
    };
    let pos = scanner.position();
    let raw = scanner.read_until(&quote.to_string())?;
    scanner.advance(); // closing quote
    decode_entities(&raw, &pos)
}

/// Parses the attribute list of a start tag, splitting `xmlns`/`xmlns:p`
/// declarations out into their own list, separate from the regular
/// attributes.
pub(crate) fn read_attributes(
    scanner: &mut Scanner<'_>,
) -> Result<(Vec<NamespaceDecl>, Vec<RawAttr>), XmlError> {
    let mut decls = Vec::new();
    let mut attrs = Vec::new();

    loop {
        let had_whitespace = matches!(scanner.peek(), Some(c) if c.is_whitespace());
        scanner.skip_whitespace();
        match scanner.peek() {
            Some('/') | Some('>') | None => break,
            _ => {}
        }
        if !had_whitespace {
            return Err(scanner.error("missing whitespace between attributes"));
        }

        let qname = scanner.read_name()?;
        scanner.skip_whitespace();
        if scanner.advance() != Some('=') {
            return Err(scanner.error("missing '=' after attribute name"));
        }
        scanner.skip_whitespace();
        let value = read_quoted_value(scanner)?;

        let (prefix, local) = split_qname(&qname);
        if qname == "xmlns" {
            decls.push(NamespaceDecl { prefix: None, uri: value });
        } else if prefix.as_deref() == Some("xmlns") {
            decls.push(NamespaceDecl { prefix: Some(local), uri: value });
        } else {
            attrs.push((prefix, local, value));
        }
    }
    Ok((decls, attrs))
}

/// Skips a `<!DOCTYPE ...>` declaration, tolerating a bracketed internal
/// subset without parsing it — brackets are depth-balanced, not parsed.
pub(crate) fn skip_doctype(scanner: &mut Scanner<'_>) -> Result<(), XmlError> {
    scanner.consume_literal("<!DOCTYPE");
    let mut depth = 0i32;
    loop {
        match scanner.advance() {
            None => return Err(scanner.error("unterminated DOCTYPE")),
            Some('[') => depth += 1,
            Some(']') => depth -= 1,
            Some('>') if depth <= 0 => return Ok(()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_a_simple_name() {
        let mut s = Scanner::new("elem:name rest");
        assert_eq!(s.read_name().unwrap(), "elem:name");
        assert_eq!(s.rest(), " rest");
    }

    #[test]
    fn rejects_illegal_name_start() {
        let mut s = Scanner::new("123abc");
        assert!(s.read_name().is_err());
    }

    #[test]
    fn decodes_predefined_and_numeric_entities() {
        let pos = Position { line: 1, column: 1, byte_offset: 0 };
        assert_eq!(decode_entities("a &amp; b &#65; &#x42;", &pos).unwrap(), "a & b A B");
    }

    #[test]
    fn leaves_unknown_entities_untouched() {
        let pos = Position { line: 1, column: 1, byte_offset: 0 };
        assert_eq!(decode_entities("&copy;", &pos).unwrap(), "&copy;");
    }

    #[test]
    fn tracks_line_and_column_across_newlines() {
        let mut s = Scanner::new("ab\ncd");
        for _ in 0..3 {
            s.advance();
        }
        assert_eq!(s.position().line, 2);
        assert_eq!(s.position().column, 1);
    }
}
