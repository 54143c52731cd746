//! Parsing, serialization, and query errors.

use core::fmt::{Display, Formatter};
use std::error;

/// A position in the source document: 1-based line and column, plus the
/// 0-based byte offset, all measured from the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (counted in chars, not bytes).
    pub column: u32,
    /// 0-based byte offset into the source.
    pub byte_offset: usize,
}

/// Errors raised while lexing or parsing XML (tree or streaming mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    /// Where in the source the error was detected.
    pub position: Position,
    /// Human-readable description.
    pub message: String,
}

impl XmlError {
    pub(crate) fn new(position: Position, message: impl Into<String>) -> Self {
        XmlError { position, message: message.into() }
    }
}

impl error::Error for XmlError {}

impl Display for XmlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}:{} (byte {}): {}",
            self.position.line, self.position.column, self.position.byte_offset, self.message
        )
    }
}

/// Errors raised while compiling or evaluating an XPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathError {
    /// Human-readable description of the syntax error.
    pub message: String,
}

impl XPathError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        XPathError { message: message.into() }
    }
}

impl error::Error for XPathError {}

impl Display for XPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
