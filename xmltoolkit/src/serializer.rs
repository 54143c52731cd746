//! Renders a [`Document`] back to XML text.

use crate::dom::{Document, NodeId, NodeKind};

/// Newline style used between serialized lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl Newline {
    fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Serializer configuration.
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    /// Emit the `<?xml ... ?>` declaration when the document has a version.
    pub declaration: bool,
    /// Per-depth-level indent string; an empty string disables pretty
    /// printing entirely.
    pub indent: String,
    /// Newline style used between lines when indenting.
    pub newline: Newline,
    /// Emit self-closing tags (`<x/>`) for empty elements; when false,
    /// empty elements render as `<x></x>`.
    pub self_close: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        SerializerOptions {
            declaration: true,
            indent: "  ".to_string(),
            newline: Newline::Lf,
            self_close: true,
        }
    }
}

/// Serializes `doc` to XML text. Total: never fails on a well-formed tree.
pub fn serialize(doc: &Document, options: &SerializerOptions) -> String {
    let mut out = String::new();
    let pretty = !options.indent.is_empty();

    if options.declaration {
        if let Some(version) = &doc.declaration.version {
            out.push_str("<?xml version=\"");
            out.push_str(version);
            out.push('"');
            if let Some(encoding) = &doc.declaration.encoding {
                out.push_str(" encoding=\"");
                out.push_str(encoding);
                out.push('"');
            }
            if let Some(standalone) = doc.declaration.standalone {
                out.push_str(" standalone=\"");
                out.push_str(if standalone { "yes" } else { "no" });
                out.push('"');
            }
            out.push_str("?>");
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
    }

    for child in doc.children(doc.root()) {
        serialize_node(doc, child, 0, options, pretty, &mut out);
    }
    out
}

fn has_structural_children(doc: &Document, id: NodeId) -> bool {
    doc.children(id).any(|c| {
        matches!(
            doc.kind(c),
            NodeKind::Element(_) | NodeKind::Comment(_) | NodeKind::ProcessingInstruction { .. }
        )
    })
}

fn write_indent(out: &mut String, options: &SerializerOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(&options.indent);
    }
}

fn serialize_node(
    doc: &Document,
    id: NodeId,
    depth: usize,
    options: &SerializerOptions,
    pretty: bool,
    out: &mut String,
) {
    match doc.kind(id) {
        NodeKind::Document => {}
        NodeKind::Element(el) => {
            write_indent(out, options, depth);
            out.push('<');
            out.push_str(&el.qname());
            for decl in &el.namespace_decls {
                out.push(' ');
                match &decl.prefix {
                    Some(p) => out.push_str(&format!("xmlns:{p}")),
                    None => out.push_str("xmlns"),
                }
                out.push_str("=\"");
                out.push_str(&encode_attribute_value(&decl.uri));
                out.push('"');
            }
            for attr in &el.attributes {
                out.push(' ');
                out.push_str(&attr.qname());
                out.push_str("=\"");
                out.push_str(&encode_attribute_value(&attr.value));
                out.push('"');
            }

            let children: Vec<NodeId> = doc.children(id).collect();
            if children.is_empty() {
                if options.self_close {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    out.push_str("</");
                    out.push_str(&el.qname());
                    out.push('>');
                }
                if pretty {
                    out.push_str(options.newline.as_str());
                }
                return;
            }

            out.push('>');
            let indent_children = pretty && has_structural_children(doc, id);
            if indent_children {
                out.push_str(options.newline.as_str());
            }
            for &child in &children {
                serialize_node(doc, child, depth + 1, options, indent_children, out);
            }
            if indent_children {
                write_indent(out, options, depth);
            }
            out.push_str("</");
            out.push_str(&el.qname());
            out.push('>');
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
        NodeKind::Text(text) => {
            write_indent(out, options, depth);
            out.push_str(&encode_text(text));
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
        NodeKind::CData(content) => {
            write_indent(out, options, depth);
            out.push_str("<![CDATA[");
            out.push_str(content);
            out.push_str("]]>");
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
        NodeKind::Comment(content) => {
            write_indent(out, options, depth);
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
        NodeKind::ProcessingInstruction { target, data } => {
            write_indent(out, options, depth);
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
            if pretty {
                out.push_str(options.newline.as_str());
            }
        }
    }
}

fn encode_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::{parse, ParserOptions};

    #[test]
    fn serializes_self_closing_element() {
        let doc = parse("<root/>", ParserOptions::default()).unwrap();
        let out = serialize(&doc, &SerializerOptions { declaration: false, ..Default::default() });
        assert!(out.starts_with("<root/>"));
    }

    #[test]
    fn self_close_false_emits_open_and_close_tags() {
        let doc = parse("<root/>", ParserOptions::default()).unwrap();
        let opts = SerializerOptions { declaration: false, self_close: false, ..Default::default() };
        let out = serialize(&doc, &opts);
        assert!(out.starts_with("<root></root>"));
    }

    #[test]
    fn encodes_entities_in_attributes_and_text() {
        let doc = parse(r#"<a x="1 &lt; 2">A &amp; B</a>"#, ParserOptions::default()).unwrap();
        let out = serialize(&doc, &SerializerOptions { declaration: false, indent: String::new(), ..Default::default() });
        assert!(out.contains("x=\"1 &lt; 2\""));
        assert!(out.contains("A &amp; B"));
    }

    #[test]
    fn text_only_children_render_inline() {
        let doc = parse("<a>hello</a>", ParserOptions::default()).unwrap();
        let out = serialize(&doc, &SerializerOptions { declaration: false, ..Default::default() });
        assert_eq!(out, "<a>hello</a>\n");
    }

    #[test]
    fn element_children_are_indented() {
        let doc = parse("<a><b/></a>", ParserOptions::default()).unwrap();
        let out = serialize(&doc, &SerializerOptions { declaration: false, ..Default::default() });
        assert_eq!(out, "<a>\n  <b/>\n</a>\n");
    }

    #[test]
    fn empty_indent_disables_pretty_printing() {
        let doc = parse("<a><b/></a>", ParserOptions::default()).unwrap();
        let opts = SerializerOptions { declaration: false, indent: String::new(), ..Default::default() };
        assert_eq!(serialize(&doc, &opts), "<a><b/></a>");
    }

    #[test]
    fn namespace_decls_precede_attributes() {
        let doc = parse(r#"<a xmlns:p="urn:p" p:x="1"/>"#, ParserOptions::default()).unwrap();
        let out = serialize(&doc, &SerializerOptions { declaration: false, indent: String::new(), ..Default::default() });
        assert_eq!(out, r#"<a xmlns:p="urn:p" p:x="1"/>"#);
    }
}
