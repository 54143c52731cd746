//! Exclusive XML Canonicalization (W3C Exclusive C14N 1.0): a byte-exact,
//! deterministic rendering of a subtree used for signing and diffing.

use crate::dom::{Document, Element, NodeId, NodeKind};

/// Canonicalization configuration.
#[derive(Debug, Clone)]
pub struct C14nOptions {
    /// Exclusive (default) vs. inclusive namespace rendering.
    pub exclusive: bool,
    /// Include comment nodes in the output.
    pub with_comments: bool,
    /// Prefixes whose ancestor namespace declaration must be rendered even
    /// if not otherwise visibly utilised (exclusive mode only).
    pub inclusive_namespaces: Vec<String>,
}

impl Default for C14nOptions {
    fn default() -> Self {
        C14nOptions { exclusive: true, with_comments: false, inclusive_namespaces: Vec::new() }
    }
}

/// Canonicalizes the subtree rooted at `id` per `options`.
pub fn canonicalize(doc: &Document, id: NodeId, options: &C14nOptions) -> String {
    let mut out = String::new();
    let mut rendered: Vec<Vec<(Option<String>, String)>> = Vec::new();
    canonicalize_node(doc, id, options, &mut rendered, &mut out);
    out
}

fn canonicalize_node(
    doc: &Document,
    id: NodeId,
    options: &C14nOptions,
    rendered_scopes: &mut Vec<Vec<(Option<String>, String)>>,
    out: &mut String,
) {
    match doc.kind(id) {
        NodeKind::Document => {
            for child in doc.children(id) {
                canonicalize_node(doc, child, options, rendered_scopes, out);
            }
        }
        NodeKind::Element(el) => {
            let already_rendered: Vec<(Option<String>, String)> =
                rendered_scopes.iter().flatten().cloned().collect();
            let to_render = namespaces_to_render(doc, id, el, options, &already_rendered);

            out.push('<');
            out.push_str(&el.qname());
            for (prefix, uri) in &to_render {
                out.push(' ');
                match prefix {
                    Some(p) => out.push_str(&format!("xmlns:{p}")),
                    None => out.push_str("xmlns"),
                }
                out.push_str("=\"");
                out.push_str(&encode_attribute_value(uri));
                out.push('"');
            }

            let mut attrs: Vec<&crate::dom::Attribute> = el.attributes.iter().collect();
            attrs.sort_by(|a, b| {
                let a_uri = a.namespace_uri.clone().unwrap_or_default();
                let b_uri = b.namespace_uri.clone().unwrap_or_default();
                a_uri.cmp(&b_uri).then_with(|| a.local_name.cmp(&b.local_name))
            });
            for attr in attrs {
                out.push(' ');
                out.push_str(&attr.qname());
                out.push_str("=\"");
                out.push_str(&encode_attribute_value(&attr.value));
                out.push('"');
            }
            out.push('>');

            rendered_scopes.push(to_render);
            for child in doc.children(id) {
                canonicalize_node(doc, child, options, rendered_scopes, out);
            }
            rendered_scopes.pop();

            out.push_str("</");
            out.push_str(&el.qname());
            out.push('>');
        }
        NodeKind::Text(text) | NodeKind::CData(text) => {
            out.push_str(&encode_text(text));
        }
        NodeKind::Comment(content) => {
            if options.with_comments {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
        }
        NodeKind::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }
}

/// Decides which namespace declarations must be emitted at this element,
/// sorted with the default namespace first, then by prefix ascending.
fn namespaces_to_render(
    doc: &Document,
    id: NodeId,
    el: &Element,
    options: &C14nOptions,
    already_rendered: &[(Option<String>, String)],
) -> Vec<(Option<String>, String)> {
    let mut visible = visible_declarations(doc, id);

    let mut to_render: Vec<(Option<String>, String)> = if options.exclusive {
        let mut used: Vec<(Option<String>, String)> = Vec::new();
        let mut utilised_prefixes: Vec<Option<String>> = vec![el.prefix.clone()];
        for attr in &el.attributes {
            if attr.prefix.is_some() {
                utilised_prefixes.push(attr.prefix.clone());
            }
        }
        for prefix in &utilised_prefixes {
            if let Some((p, uri)) = visible.iter().find(|(p, _)| p == prefix) {
                if !used.iter().any(|(up, _)| up == p) {
                    used.push((p.clone(), uri.clone()));
                }
            }
        }
        for wanted in &options.inclusive_namespaces {
            let key = Some(wanted.clone());
            if let Some((p, uri)) = visible.iter().find(|(p, _)| p == &key) {
                if !used.iter().any(|(up, _)| up == p) {
                    used.push((p.clone(), uri.clone()));
                }
            }
        }
        used
    } else {
        std::mem::take(&mut visible)
    };

    if options.exclusive {
        to_render.retain(|decl| !already_rendered.contains(decl));
    }
    to_render.sort_by(|a, b| match (&a.0, &b.0) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(ap), Some(bp)) => ap.cmp(bp),
    });
    to_render
}

/// All namespace declarations visible at `id`: its own, then its ancestors'
/// (closest wins when a prefix repeats), innermost first.
fn visible_declarations(doc: &Document, id: NodeId) -> Vec<(Option<String>, String)> {
    let mut seen_prefixes: Vec<Option<String>> = Vec::new();
    let mut out = Vec::new();

    let mut chain = vec![id];
    chain.extend(doc.ancestors(id));
    for node in chain {
        if let Some(el) = doc.element(node) {
            for decl in &el.namespace_decls {
                if !seen_prefixes.contains(&decl.prefix) {
                    seen_prefixes.push(decl.prefix.clone());
                    out.push((decl.prefix.clone(), decl.uri.clone()));
                }
            }
        }
    }
    out
}

fn encode_attribute_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
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
            '\r' => out.push_str("&#xD;"),
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
    fn no_declaration_and_lf_only() {
        let doc = parse("<root>line1\r\nline2</root>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let out = canonicalize(&doc, root, &C14nOptions::default());
        assert!(!out.contains("<?xml"));
        assert!(out.contains("&#xD;"));
    }

    #[test]
    fn empty_elements_are_never_self_closing() {
        let doc = parse("<root><child/></root>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let out = canonicalize(&doc, root, &C14nOptions::default());
        assert!(out.contains("<child></child>"));
    }

    #[test]
    fn exclusive_mode_drops_unused_ancestor_namespace() {
        let doc =
            parse(r#"<root xmlns:a="urn:a" xmlns:b="urn:b"><a:child/></root>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let child = doc.children_elements(root).next().unwrap();
        let out = canonicalize(&doc, child, &C14nOptions { exclusive: true, ..Default::default() });
        assert!(out.contains("xmlns:a=\"urn:a\""));
        assert!(!out.contains("urn:b"));
    }

    #[test]
    fn inclusive_mode_emits_every_ancestor_declaration() {
        let doc =
            parse(r#"<root xmlns:a="urn:a" xmlns:b="urn:b"><a:child/></root>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let child = doc.children_elements(root).next().unwrap();
        let out = canonicalize(&doc, child, &C14nOptions { exclusive: false, ..Default::default() });
        assert!(out.contains("urn:a"));
        assert!(out.contains("urn:b"));
    }

    #[test]
    fn comments_excluded_by_default() {
        let doc = parse("<root><!-- hidden --></root>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let out = canonicalize(&doc, root, &C14nOptions::default());
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn with_comments_includes_them() {
        let doc = parse("<root><!-- shown --></root>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let out = canonicalize(&doc, root, &C14nOptions { with_comments: true, ..Default::default() });
        assert!(out.contains("<!-- shown -->"));
    }

    #[test]
    fn attributes_sorted_by_namespace_uri_then_local_name() {
        let doc = parse(r#"<root xmlns:z="urn:z" z:b="1" a="2"/>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let out = canonicalize(&doc, root, &C14nOptions::default());
        let a_pos = out.find("a=\"2\"").unwrap();
        let b_pos = out.find("z:b=\"1\"").unwrap();
        assert!(a_pos < b_pos, "unnamespaced attribute should sort before a namespaced one");
    }
}
