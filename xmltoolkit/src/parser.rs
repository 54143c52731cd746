//! Recursive-descent tree parser: lexes with [`crate::lexer`], resolves
//! namespaces with [`crate::namespace`], and builds a [`Document`].
//!
//! Whitespace-only text nodes between elements are dropped unless
//! `preserve_whitespace` is set; comments, processing instructions, and
//! `CDATA` sections each have their own preservation flag so callers can
//! trade fidelity for a smaller tree.

use tracing::{instrument, trace_span};

use crate::dom::{Attribute, Document, Element, NodeId, NodeKind};
use crate::error::XmlError;
use crate::lexer::{decode_entities, read_attributes, read_quoted_value, skip_doctype, split_qname, Scanner};
use crate::namespace::ScopeStack;

/// Parser configuration controlling which incidental nodes survive into
/// the tree.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Keep text nodes that are entirely whitespace between elements.
    pub preserve_whitespace: bool,
    /// Keep `Comment` nodes (otherwise they are dropped).
    pub preserve_comments: bool,
    /// Keep `ProcessingInstruction` nodes.
    pub preserve_pis: bool,
    /// Keep `CData` nodes distinct from `Text` (otherwise folded in).
    pub preserve_cdata: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            preserve_whitespace: false,
            preserve_comments: true,
            preserve_pis: true,
            preserve_cdata: true,
        }
    }
}

/// Parses a complete XML document per `options`.
#[instrument(skip(input))]
pub fn parse(input: &str, options: ParserOptions) -> Result<Document, XmlError> {
    let _span = trace_span!("xml_parse").entered();
    let mut scanner = Scanner::new(input);
    let mut doc = Document::new();
    let root = doc.root();
    let mut scopes = ScopeStack::default();

    parse_declaration(&mut scanner, &mut doc)?;
    skip_misc(&mut scanner, &mut doc, root, &options)?;

    if scanner.starts_with("<!DOCTYPE") {
        skip_doctype(&mut scanner)?;
        skip_misc(&mut scanner, &mut doc, root, &options)?;
    }

    if scanner.is_eof() {
        return Err(scanner.error("unexpected end of input: no root element"));
    }
    parse_element(&mut scanner, &mut doc, root, &mut scopes, &options)?;

    skip_misc(&mut scanner, &mut doc, root, &options)?;
    Ok(doc)
}

fn parse_declaration(scanner: &mut Scanner<'_>, doc: &mut Document) -> Result<(), XmlError> {
    if !scanner.starts_with("<?xml") {
        return Ok(());
    }
    scanner.consume_literal("<?xml");
    let attrs = parse_pi_attr_list(scanner)?;
    if !scanner.consume_literal("?>") {
        return Err(scanner.error("unterminated XML declaration"));
    }
    for (name, value) in attrs {
        match name.as_str() {
            "version" => doc.declaration.version = Some(value),
            "encoding" => doc.declaration.encoding = Some(value),
            "standalone" => doc.declaration.standalone = Some(value == "yes"),
            _ => {}
        }
    }
    Ok(())
}

/// Parses `name="value"` pairs inside the XML declaration's pseudo-attribute
/// syntax (reuses the same quoting rules as real attributes).
fn parse_pi_attr_list(scanner: &mut Scanner<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attrs = Vec::new();
    loop {
        scanner.skip_whitespace();
        if scanner.starts_with("?>") || scanner.is_eof() {
            break;
        }
        let name = scanner.read_name()?;
        scanner.skip_whitespace();
        if scanner.advance() != Some('=') {
            return Err(scanner.error("expected '=' after declaration attribute name"));
        }
        scanner.skip_whitespace();
        let value = read_quoted_value(scanner)?;
        attrs.push((name, value));
    }
    Ok(attrs)
}

/// Skips (and optionally records) whitespace, comments, and PIs between
/// the prolog, root element, and epilog.
fn skip_misc(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    loop {
        scanner.skip_whitespace();
        if scanner.starts_with("<!--") {
            parse_comment(scanner, doc, parent, options)?;
        } else if scanner.starts_with("<?") {
            parse_pi(scanner, doc, parent, options)?;
        } else {
            return Ok(());
        }
    }
}

fn parse_comment(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    let pos = scanner.position();
    scanner.consume_literal("<!--");
    let content = scanner.read_until("-->")?;
    scanner.consume_literal("-->");
    if content.contains("--") {
        return Err(XmlError::new(pos, "comment must not contain '--'"));
    }
    if options.preserve_comments {
        doc.push_node(parent, NodeKind::Comment(content));
    }
    Ok(())
}

fn parse_pi(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    scanner.consume_literal("<?");
    let target = scanner.read_name()?;
    scanner.skip_whitespace();
    let data = scanner.read_until("?>")?;
    if !scanner.consume_literal("?>") {
        return Err(scanner.error("unterminated processing instruction"));
    }
    if options.preserve_pis {
        doc.push_node(parent, NodeKind::ProcessingInstruction { target, data });
    }
    Ok(())
}

fn parse_element(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    scopes: &mut ScopeStack,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    let open_pos = scanner.position();
    if scanner.advance() != Some('<') {
        return Err(scanner.error("expected '<'"));
    }
    let qname = scanner.read_name()?;
    let (raw_prefix, local_name) = split_qname(&qname);

    let (decls, mut raw_attrs) = read_attributes(scanner)?;
    scopes.push(decls.clone());

    let namespace_uri = scopes.resolve(raw_prefix.as_deref());
    if raw_prefix.is_some() && namespace_uri.is_none() {
        return Err(XmlError::new(open_pos, format!("unbound namespace prefix {qname:?}")));
    }

    let attributes = raw_attrs
        .drain(..)
        .map(|(prefix, local, value)| {
            let namespace_uri = prefix.as_deref().and_then(|p| scopes.resolve(Some(p)));
            Attribute { prefix, local_name: local, value, namespace_uri }
        })
        .collect();

    let element = Element {
        prefix: raw_prefix,
        local_name: local_name.clone(),
        namespace_uri,
        namespace_decls: decls,
        attributes,
    };
    let element_id = doc.push_node(parent, NodeKind::Element(element));

    scanner.skip_whitespace();
    if scanner.consume_literal("/>") {
        scopes.pop();
        return Ok(());
    }
    if scanner.advance() != Some('>') {
        return Err(scanner.error("expected '>' or '/>' to close start tag"));
    }

    parse_content(scanner, doc, element_id, scopes, options)?;

    let close_pos = scanner.position();
    if !scanner.consume_literal("</") {
        return Err(XmlError::new(close_pos, format!("expected end tag for {qname:?}")));
    }
    let close_name = scanner.read_name()?;
    scanner.skip_whitespace();
    if scanner.advance() != Some('>') {
        return Err(scanner.error("expected '>' to close end tag"));
    }
    if close_name != qname {
        return Err(XmlError::new(
            close_pos,
            format!("mismatched end tag: expected {qname:?}, found {close_name:?}"),
        ));
    }

    scopes.pop();
    Ok(())
}

fn parse_content(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    scopes: &mut ScopeStack,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    loop {
        if scanner.starts_with("</") {
            return Ok(());
        }
        if scanner.is_eof() {
            return Err(scanner.error("unexpected end of input inside element content"));
        }
        if scanner.starts_with("<!--") {
            parse_comment(scanner, doc, parent, options)?;
        } else if scanner.starts_with("<![CDATA[") {
            parse_cdata(scanner, doc, parent, options)?;
        } else if scanner.starts_with("<?") {
            parse_pi(scanner, doc, parent, options)?;
        } else if scanner.starts_with("<") {
            parse_element(scanner, doc, parent, scopes, options)?;
        } else {
            parse_text(scanner, doc, parent, options)?;
        }
    }
}

fn parse_cdata(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    scanner.consume_literal("<![CDATA[");
    let content = scanner.read_until("]]>")?;
    scanner.consume_literal("]]>");
    if options.preserve_cdata {
        doc.push_node(parent, NodeKind::CData(content));
    } else {
        fold_into_preceding_text(doc, parent, &content);
    }
    Ok(())
}

fn parse_text(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    parent: NodeId,
    options: &ParserOptions,
) -> Result<(), XmlError> {
    let pos = scanner.position();
    let start_offset = pos.byte_offset;
    let from_here = scanner.rest();
    while !scanner.is_eof() && scanner.peek() != Some('<') {
        scanner.advance();
    }
    let consumed = scanner.position().byte_offset - start_offset;
    let text = decode_entities(&from_here[..consumed], &pos)?;

    if text.trim().is_empty() && !options.preserve_whitespace {
        return Ok(());
    }
    doc.push_node(parent, NodeKind::Text(text));
    Ok(())
}

fn fold_into_preceding_text(doc: &mut Document, parent: NodeId, content: &str) {
    let children: Vec<NodeId> = doc.children(parent).collect();
    if let Some(&last) = children.last() {
        if let NodeKind::Text(existing) = doc.kind_mut(last) {
            existing.push_str(content);
            return;
        }
    }
    doc.push_node(parent, NodeKind::Text(content.to_string()));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_minimal_element() {
        let doc = parse("<root/>", ParserOptions::default()).unwrap();
        let root_el = doc.root_element().unwrap();
        assert_eq!(doc.element(root_el).unwrap().local_name, "root");
    }

    #[test]
    fn parses_declaration() {
        let doc = parse(r#"<?xml version="1.0" encoding="UTF-8"?><root/>"#, ParserOptions::default()).unwrap();
        assert_eq!(doc.declaration.version.as_deref(), Some("1.0"));
        assert_eq!(doc.declaration.encoding.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn resolves_default_namespace_on_element_not_attribute() {
        let doc = parse(r#"<root xmlns="urn:a" attr="v"/>"#, ParserOptions::default()).unwrap();
        let root_el = doc.root_element().unwrap();
        let el = doc.element(root_el).unwrap();
        assert_eq!(el.namespace_uri.as_deref(), Some("urn:a"));
        assert_eq!(el.attributes[0].namespace_uri, None);
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let err = parse("<a><b></a></a>", ParserOptions::default()).unwrap_err();
        assert!(err.message.contains("mismatched"));
    }

    #[test]
    fn rejects_dashdash_in_comment() {
        let err = parse("<a><!-- a -- b --></a>", ParserOptions::default()).unwrap_err();
        assert!(err.message.contains("--"));
    }

    #[test]
    fn skips_doctype() {
        let doc = parse("<!DOCTYPE root [ <!ENTITY x \"y\"> ]><root/>", ParserOptions::default()).unwrap();
        assert!(doc.root_element().is_some());
    }

    #[test]
    fn cdata_preserved_by_default() {
        let doc = parse("<root><![CDATA[<not a tag>]]></root>", ParserOptions::default()).unwrap();
        let root_el = doc.root_element().unwrap();
        let child = doc.children(root_el).next().unwrap();
        assert!(matches!(doc.kind(child), NodeKind::CData(s) if s == "<not a tag>"));
    }
}
