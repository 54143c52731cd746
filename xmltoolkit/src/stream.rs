//! The streaming (SAX-like) parser variant: same lexer and namespace rules
//! as [`crate::parser`], but no tree is built — events are produced in
//! source order for a caller to consume incrementally.

use crate::dom::{Attribute, NamespaceDecl};
use crate::error::XmlError;
use crate::lexer::{decode_entities, read_attributes, read_quoted_value, skip_doctype, split_qname, Scanner};
use crate::namespace::ScopeStack;
use crate::parser::ParserOptions;

/// One token of streaming parser output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Emitted once, before anything else.
    DocumentStart,
    /// The `<?xml ...?>` declaration, if the document has one.
    XmlDeclaration {
        /// Declared version.
        version: String,
        /// Declared encoding, if any.
        encoding: Option<String>,
        /// Declared standalone value, if any.
        standalone: Option<bool>,
    },
    /// A start tag, with its resolved namespace info.
    ElementStart {
        /// The raw qualified name as written.
        qname: String,
        /// Non-namespace attributes, in source order.
        attrs: Vec<Attribute>,
        /// This element's own namespace declarations.
        ns_decls: Vec<NamespaceDecl>,
        /// The qualified name's prefix, if any.
        prefix: Option<String>,
        /// The qualified name's local part.
        local_name: String,
        /// The resolved namespace URI, if any.
        namespace_uri: Option<String>,
    },
    /// An end tag, mirroring the `ElementStart` that opened it.
    ElementEnd {
        /// The raw qualified name as written.
        qname: String,
        /// The qualified name's prefix, if any.
        prefix: Option<String>,
        /// The qualified name's local part.
        local_name: String,
        /// The resolved namespace URI, if any.
        namespace_uri: Option<String>,
    },
    /// A run of decoded character data.
    Text(String),
    /// A `CDATA` section's raw content.
    CData(String),
    /// A comment's content.
    Comment(String),
    /// A processing instruction.
    ProcessingInstruction {
        /// The PI target.
        target: String,
        /// The PI's data.
        data: String,
    },
    /// Emitted once, after everything else.
    DocumentEnd,
}

/// A pull-based streaming reader: each call to `next()` (via its `Iterator`
/// impl) returns the next event, or `None` once `DocumentEnd` has been
/// produced. A caller cancels simply by dropping the reader or ceasing to
/// call `next()`.
pub struct StreamReader<'a> {
    scanner: Scanner<'a>,
    scopes: ScopeStack,
    options: ParserOptions,
    open: Vec<(String, Option<String>, String, Option<String>)>,
    state: State,
}

enum State {
    Start,
    Declaration,
    Body,
    Done,
}

impl<'a> StreamReader<'a> {
    /// Builds a reader over `input` with the given parser options.
    pub fn new(input: &'a str, options: ParserOptions) -> Self {
        StreamReader {
            scanner: Scanner::new(input),
            scopes: ScopeStack::default(),
            options,
            open: Vec::new(),
            state: State::Start,
        }
    }

    fn step(&mut self) -> Option<Result<Event, XmlError>> {
        match self.state {
            State::Start => {
                self.state = State::Declaration;
                Some(Ok(Event::DocumentStart))
            }
            State::Declaration => {
                self.state = State::Body;
                self.read_declaration().transpose()
            }
            State::Body => self.read_body_step(),
            State::Done => None,
        }
    }

    fn read_declaration(&mut self) -> Option<Result<Event, XmlError>> {
        if !self.scanner.starts_with("<?xml") {
            return None;
        }
        self.scanner.consume_literal("<?xml");
        let mut version = String::from("1.0");
        let mut encoding = None;
        let mut standalone = None;
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.starts_with("?>") {
                break;
            }
            let name = match self.scanner.read_name() {
                Ok(n) => n,
                Err(e) => return Some(Err(e)),
            };
            self.scanner.skip_whitespace();
            if self.scanner.advance() != Some('=') {
                return Some(Err(self.scanner.error("expected '=' in XML declaration")));
            }
            self.scanner.skip_whitespace();
            let value = match read_quoted_value(&mut self.scanner) {
                Ok(v) => v,
                Err(e) => return Some(Err(e)),
            };
            match name.as_str() {
                "version" => version = value,
                "encoding" => encoding = Some(value),
                "standalone" => standalone = Some(value == "yes"),
                _ => {}
            }
        }
        self.scanner.consume_literal("?>");
        Some(Ok(Event::XmlDeclaration { version, encoding, standalone }))
    }

    fn read_body_step(&mut self) -> Option<Result<Event, XmlError>> {
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.starts_with("<!DOCTYPE") {
                if let Err(e) = skip_doctype(&mut self.scanner) {
                    return Some(Err(e));
                }
                continue;
            }
            if self.scanner.starts_with("<!--") {
                return Some(self.read_comment());
            }
            if self.scanner.starts_with("<![CDATA[") {
                return Some(self.read_cdata());
            }
            if self.scanner.starts_with("<?") {
                return Some(self.read_pi());
            }
            if self.scanner.starts_with("</") {
                return Some(self.read_element_end());
            }
            if self.scanner.starts_with("<") {
                return Some(self.read_element_start());
            }
            if self.scanner.is_eof() {
                self.state = State::Done;
                return Some(Ok(Event::DocumentEnd));
            }
            return Some(self.read_text());
        }
    }

    fn read_comment(&mut self) -> Result<Event, XmlError> {
        let pos = self.scanner.position();
        self.scanner.consume_literal("<!--");
        let content = self.scanner.read_until("-->")?;
        self.scanner.consume_literal("-->");
        if content.contains("--") {
            return Err(XmlError::new(pos, "comment must not contain '--'"));
        }
        Ok(Event::Comment(content))
    }

    fn read_cdata(&mut self) -> Result<Event, XmlError> {
        self.scanner.consume_literal("<![CDATA[");
        let content = self.scanner.read_until("]]>")?;
        self.scanner.consume_literal("]]>");
        Ok(Event::CData(content))
    }

    fn read_pi(&mut self) -> Result<Event, XmlError> {
        self.scanner.consume_literal("<?");
        let target = self.scanner.read_name()?;
        self.scanner.skip_whitespace();
        let data = self.scanner.read_until("?>")?;
        if !self.scanner.consume_literal("?>") {
            return Err(self.scanner.error("unterminated processing instruction"));
        }
        Ok(Event::ProcessingInstruction { target, data })
    }

    fn read_text(&mut self) -> Result<Event, XmlError> {
        let pos = self.scanner.position();
        let start_offset = pos.byte_offset;
        let from_here = self.scanner.rest();
        while !self.scanner.is_eof() && self.scanner.peek() != Some('<') {
            self.scanner.advance();
        }
        let consumed = self.scanner.position().byte_offset - start_offset;
        let text = decode_entities(&from_here[..consumed], &pos)?;
        Ok(Event::Text(text))
    }

    fn read_element_start(&mut self) -> Result<Event, XmlError> {
        let open_pos = self.scanner.position();
        self.scanner.advance(); // '<'
        let qname = self.scanner.read_name()?;
        let (raw_prefix, local_name) = split_qname(&qname);

        let (decls, raw_attrs) = read_attributes(&mut self.scanner)?;
        self.scopes.push(decls.clone());

        let namespace_uri = self.scopes.resolve(raw_prefix.as_deref());
        if raw_prefix.is_some() && namespace_uri.is_none() {
            return Err(XmlError::new(open_pos, format!("unbound namespace prefix {qname:?}")));
        }

        let attrs = raw_attrs
            .into_iter()
            .map(|(prefix, local, value)| {
                let namespace_uri = prefix.as_deref().and_then(|p| self.scopes.resolve(Some(p)));
                Attribute { prefix, local_name: local, value, namespace_uri }
            })
            .collect();

        self.scanner.skip_whitespace();
        let self_closing = self.scanner.starts_with("/>");
        if self_closing {
            self.scanner.consume_literal("/>");
        } else if self.scanner.advance() != Some('>') {
            return Err(self.scanner.error("expected '>' or '/>' to close start tag"));
        }

        if self_closing {
            self.scopes.pop();
        } else {
            self.open.push((qname.clone(), raw_prefix.clone(), local_name.clone(), namespace_uri.clone()));
        }

        Ok(Event::ElementStart { qname, attrs, ns_decls: decls, prefix: raw_prefix, local_name, namespace_uri })
    }

    fn read_element_end(&mut self) -> Result<Event, XmlError> {
        let close_pos = self.scanner.position();
        self.scanner.consume_literal("</");
        let close_name = self.scanner.read_name()?;
        self.scanner.skip_whitespace();
        if self.scanner.advance() != Some('>') {
            return Err(self.scanner.error("expected '>' to close end tag"));
        }
        let Some((open_qname, prefix, local_name, namespace_uri)) = self.open.pop() else {
            return Err(XmlError::new(close_pos, format!("unexpected end tag {close_name:?}")));
        };
        if close_name != open_qname {
            return Err(XmlError::new(
                close_pos,
                format!("mismatched end tag: expected {open_qname:?}, found {close_name:?}"),
            ));
        }
        self.scopes.pop();
        Ok(Event::ElementEnd { qname: close_name, prefix, local_name, namespace_uri })
    }
}

impl<'a> Iterator for StreamReader<'a> {
    type Item = Result<Event, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.step()?;
        if event.is_err() {
            self.state = State::Done;
        }
        Some(event)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn emits_document_start_and_end() {
        let events: Vec<_> = StreamReader::new("<a/>", ParserOptions::default())
            .map(|e| e.unwrap())
            .collect();
        assert!(matches!(events.first(), Some(Event::DocumentStart)));
        assert!(matches!(events.last(), Some(Event::DocumentEnd)));
    }

    #[test]
    fn emits_matching_start_and_end_for_nested_elements() {
        let events: Vec<_> = StreamReader::new("<a><b/></a>", ParserOptions::default())
            .map(|e| e.unwrap())
            .collect();
        let starts = events.iter().filter(|e| matches!(e, Event::ElementStart { .. })).count();
        let ends = events.iter().filter(|e| matches!(e, Event::ElementEnd { .. })).count();
        assert_eq!(starts, 2);
        assert_eq!(ends, 2);
    }

    #[test]
    fn reports_mismatched_end_tag_as_error() {
        let result: Result<Vec<_>, _> = StreamReader::new("<a></b>", ParserOptions::default()).collect();
        assert!(result.is_err());
    }

    #[test]
    fn cancels_by_stopping_iteration_early() {
        let mut reader = StreamReader::new("<a><b/><c/></a>", ParserOptions::default());
        let first = reader.next();
        assert!(matches!(first, Some(Ok(Event::DocumentStart))));
        // Dropping `reader` here without exhausting it is a valid cancellation.
    }
}
