//! A permissive subset of XPath 1.0 evaluated directly over the in-memory
//! [`Document`]: absolute/relative paths, `//` descendant shortcuts, the
//! `child`/`descendant`/`self`/`parent`/`attribute` axes, name/wildcard/
//! `text()`/`node()` tests, and position/attribute/child predicates.

use std::collections::HashMap;

use itertools::Itertools as _;

use crate::dom::{Attribute, Document, NodeId, NodeKind};
use crate::error::XPathError;

/// Caller-supplied prefix→URI bindings used to resolve prefixed name tests.
#[derive(Debug, Clone, Default)]
pub struct XPathContext {
    namespaces: HashMap<String, String>,
}

impl XPathContext {
    /// An empty context: only unprefixed tests will match anything.
    pub fn new() -> Self {
        XPathContext::default()
    }

    /// Binds `prefix` to `uri`, returning `self` for chaining.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }
}

/// A matched item: either a tree node or an attribute of an element (the
/// DOM does not model attributes as their own arena nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathItem {
    /// A document/element/text/CData/comment/PI node.
    Node(NodeId),
    /// The attribute at `attributes[index]` on the given element.
    Attribute(NodeId, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
    SelfAxis,
    Parent,
    Attribute,
    DescendantAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    AnyNode,
    Text,
    Wildcard { prefix: Option<String> },
    Name { prefix: Option<String>, local: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    AttrExists(String),
    AttrEquals(String, String),
    ChildExists(String),
    ChildEquals(String, String),
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// Evaluates `expr` starting from `context`, returning the matched items in
/// first-seen document order with duplicates removed.
pub fn evaluate(
    doc: &Document,
    context: NodeId,
    expr: &str,
    ctx: &XPathContext,
) -> Result<Vec<XPathItem>, XPathError> {
    let (absolute, steps) = parse(expr)?;
    let mut current = vec![XPathItem::Node(if absolute { doc.root() } else { context })];
    for step in &steps {
        current = apply_step(doc, &current, step, ctx);
    }
    Ok(current.into_iter().unique().collect())
}

/// The first matched item, if any.
pub fn first(
    doc: &Document,
    context: NodeId,
    expr: &str,
    ctx: &XPathContext,
) -> Result<Option<XPathItem>, XPathError> {
    Ok(evaluate(doc, context, expr, ctx)?.into_iter().next())
}

/// The string-value of each matched item: a node's [`Document::text_value`],
/// or an attribute's raw value.
pub fn texts(
    doc: &Document,
    context: NodeId,
    expr: &str,
    ctx: &XPathContext,
) -> Result<Vec<String>, XPathError> {
    Ok(evaluate(doc, context, expr, ctx)?
        .into_iter()
        .map(|item| match item {
            XPathItem::Node(id) => doc.text_value(id),
            XPathItem::Attribute(el, index) => doc
                .element(el)
                .and_then(|e| e.attributes.get(index))
                .map(|a| a.value.clone())
                .unwrap_or_default(),
        })
        .collect())
}

fn apply_step(doc: &Document, items: &[XPathItem], step: &Step, ctx: &XPathContext) -> Vec<XPathItem> {
    let mut out = Vec::new();
    for &item in items {
        let XPathItem::Node(node_id) = item else { continue };
        let mut candidates = Vec::new();
        match step.axis {
            Axis::Child => {
                for c in doc.children(node_id) {
                    if node_matches(doc, c, &step.test, ctx) {
                        candidates.push(XPathItem::Node(c));
                    }
                }
            }
            Axis::Descendant => {
                for d in doc.descendants(node_id) {
                    if node_matches(doc, d, &step.test, ctx) {
                        candidates.push(XPathItem::Node(d));
                    }
                }
            }
            Axis::SelfAxis => {
                if node_matches(doc, node_id, &step.test, ctx) {
                    candidates.push(XPathItem::Node(node_id));
                }
            }
            Axis::Parent => {
                if let Some(p) = doc.parent(node_id) {
                    if node_matches(doc, p, &step.test, ctx) {
                        candidates.push(XPathItem::Node(p));
                    }
                }
            }
            Axis::Attribute => {
                collect_attributes(doc, node_id, &step.test, ctx, &mut candidates);
            }
            Axis::DescendantAttribute => {
                collect_attributes(doc, node_id, &step.test, ctx, &mut candidates);
                for d in doc.descendants(node_id) {
                    collect_attributes(doc, d, &step.test, ctx, &mut candidates);
                }
            }
        }
        out.extend(apply_predicates(doc, candidates, &step.predicates));
    }
    out
}

fn collect_attributes(
    doc: &Document,
    node_id: NodeId,
    test: &NodeTest,
    ctx: &XPathContext,
    out: &mut Vec<XPathItem>,
) {
    let Some(el) = doc.element(node_id) else { return };
    for (i, attr) in el.attributes.iter().enumerate() {
        if attribute_matches(attr, test, ctx) {
            out.push(XPathItem::Attribute(node_id, i));
        }
    }
}

fn node_matches(doc: &Document, id: NodeId, test: &NodeTest, ctx: &XPathContext) -> bool {
    match test {
        NodeTest::AnyNode => true,
        NodeTest::Text => matches!(doc.kind(id), NodeKind::Text(_) | NodeKind::CData(_)),
        NodeTest::Wildcard { prefix } => {
            let Some(el) = doc.element(id) else { return false };
            match prefix {
                None => true,
                Some(p) => ctx.resolve(p).is_some_and(|uri| el.namespace_uri.as_deref() == Some(uri)),
            }
        }
        NodeTest::Name { prefix, local } => {
            let Some(el) = doc.element(id) else { return false };
            match prefix {
                Some(p) => ctx
                    .resolve(p)
                    .is_some_and(|uri| el.namespace_uri.as_deref() == Some(uri) && &el.local_name == local),
                None => &el.local_name == local || &el.qname() == local,
            }
        }
    }
}

fn attribute_matches(attr: &Attribute, test: &NodeTest, ctx: &XPathContext) -> bool {
    match test {
        NodeTest::AnyNode => true,
        NodeTest::Text => false,
        NodeTest::Wildcard { prefix } => match prefix {
            None => true,
            Some(p) => ctx.resolve(p).is_some_and(|uri| attr.namespace_uri.as_deref() == Some(uri)),
        },
        NodeTest::Name { prefix, local } => match prefix {
            Some(p) => ctx
                .resolve(p)
                .is_some_and(|uri| attr.namespace_uri.as_deref() == Some(uri) && &attr.local_name == local),
            None => &attr.local_name == local || &attr.qname() == local,
        },
    }
}

fn apply_predicates(doc: &Document, mut items: Vec<XPathItem>, predicates: &[Predicate]) -> Vec<XPathItem> {
    for predicate in predicates {
        items = match predicate {
            Predicate::Position(n) => items.into_iter().nth(n.saturating_sub(1)).into_iter().collect(),
            Predicate::AttrExists(name) => items
                .into_iter()
                .filter(|item| element_has_attr(doc, item, |a| &a.local_name == name || &a.qname() == name))
                .collect(),
            Predicate::AttrEquals(name, value) => items
                .into_iter()
                .filter(|item| {
                    element_has_attr(doc, item, |a| (&a.local_name == name || &a.qname() == name) && &a.value == value)
                })
                .collect(),
            Predicate::ChildExists(name) => items
                .into_iter()
                .filter(|item| element_has_child(doc, item, name, None))
                .collect(),
            Predicate::ChildEquals(name, value) => items
                .into_iter()
                .filter(|item| element_has_child(doc, item, name, Some(value)))
                .collect(),
        };
    }
    items
}

fn element_has_attr(doc: &Document, item: &XPathItem, predicate: impl Fn(&Attribute) -> bool) -> bool {
    let XPathItem::Node(id) = *item else { return false };
    doc.element(id).is_some_and(|el| el.attributes.iter().any(predicate))
}

fn element_has_child(doc: &Document, item: &XPathItem, name: &str, value: Option<&String>) -> bool {
    let XPathItem::Node(id) = *item else { return false };
    doc.children_elements(id).any(|c| {
        let Some(el) = doc.element(c) else { return false };
        let name_matches = el.local_name == name || el.qname() == name;
        name_matches && value.map(|v| &doc.text_value(c) == v).unwrap_or(true)
    })
}

fn parse(expr: &str) -> Result<(bool, Vec<Step>), XPathError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(XPathError::new("empty XPath expression"));
    }
    let absolute = trimmed.starts_with('/');
    let tokens = tokenize(trimmed)?;
    let steps = tokens
        .into_iter()
        .map(|(descendant, raw)| parse_step(&raw, descendant))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((absolute, steps))
}

/// Splits a path expression on top-level (outside quotes/brackets) `/` and
/// `//`, returning `(was_preceded_by_double_slash, step_text)` pairs.
fn tokenize(expr: &str) -> Result<Vec<(bool, String)>, XPathError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut pending_descendant = false;
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
                i += 1;
            }
            '[' => {
                depth += 1;
                current.push(c);
                i += 1;
            }
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(XPathError::new("unmatched ']'"));
                }
                current.push(c);
                i += 1;
            }
            '/' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push((pending_descendant, std::mem::take(&mut current)));
                    pending_descendant = false;
                }
                if chars.get(i + 1) == Some(&'/') {
                    pending_descendant = true;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => {
                current.push(c);
                i += 1;
            }
        }
    }
    if depth != 0 {
        return Err(XPathError::new("unclosed '['"));
    }
    if !current.is_empty() {
        tokens.push((pending_descendant, current));
    } else if pending_descendant {
        return Err(XPathError::new("trailing '//' with no following step"));
    }
    Ok(tokens)
}

fn parse_step(raw: &str, descendant: bool) -> Result<Step, XPathError> {
    let (test_str, pred_strs) = split_test_and_predicates(raw)?;
    let test_str = test_str.trim();
    if test_str.is_empty() {
        return Err(XPathError::new("empty step"));
    }

    let (axis, test) = if test_str == "." {
        (Axis::SelfAxis, NodeTest::AnyNode)
    } else if test_str == ".." {
        (Axis::Parent, NodeTest::AnyNode)
    } else if let Some(rest) = test_str.strip_prefix('@') {
        let axis = if descendant { Axis::DescendantAttribute } else { Axis::Attribute };
        (axis, parse_node_test(rest))
    } else {
        let axis = if descendant { Axis::Descendant } else { Axis::Child };
        (axis, parse_node_test(test_str))
    };

    let predicates = pred_strs.iter().map(|p| parse_predicate(p)).collect::<Result<Vec<_>, _>>()?;
    Ok(Step { axis, test, predicates })
}

fn parse_node_test(s: &str) -> NodeTest {
    if s == "text()" {
        return NodeTest::Text;
    }
    if s == "node()" {
        return NodeTest::AnyNode;
    }
    if s == "*" {
        return NodeTest::Wildcard { prefix: None };
    }
    match s.split_once(':') {
        Some((prefix, "*")) => NodeTest::Wildcard { prefix: Some(prefix.to_string()) },
        Some((prefix, local)) => NodeTest::Name { prefix: Some(prefix.to_string()), local: local.to_string() },
        None => NodeTest::Name { prefix: None, local: s.to_string() },
    }
}

fn split_test_and_predicates(raw: &str) -> Result<(String, Vec<String>), XPathError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    let mut test = String::new();
    let mut quote: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            test.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                test.push(c);
                i += 1;
            }
            '[' => break,
            _ => {
                test.push(c);
                i += 1;
            }
        }
    }

    let mut preds = Vec::new();
    while i < chars.len() {
        if chars[i] != '[' {
            return Err(XPathError::new("expected '[' to start a predicate"));
        }
        i += 1;
        let mut pred = String::new();
        let mut depth = 1i32;
        let mut q: Option<char> = None;
        while i < chars.len() && depth > 0 {
            let c = chars[i];
            if let Some(qq) = q {
                pred.push(c);
                if c == qq {
                    q = None;
                }
                i += 1;
                continue;
            }
            match c {
                '\'' | '"' => {
                    q = Some(c);
                    pred.push(c);
                    i += 1;
                }
                '[' => {
                    depth += 1;
                    pred.push(c);
                    i += 1;
                }
                ']' => {
                    depth -= 1;
                    if depth > 0 {
                        pred.push(c);
                    }
                    i += 1;
                }
                _ => {
                    pred.push(c);
                    i += 1;
                }
            }
        }
        if depth != 0 {
            return Err(XPathError::new("unclosed '['"));
        }
        preds.push(pred);
    }
    Ok((test, preds))
}

fn parse_predicate(p: &str) -> Result<Predicate, XPathError> {
    let p = p.trim();
    if p.is_empty() {
        return Err(XPathError::new("empty predicate"));
    }
    if p.chars().all(|c| c.is_ascii_digit()) {
        return p
            .parse::<usize>()
            .map(Predicate::Position)
            .map_err(|_| XPathError::new(format!("invalid position predicate {p:?}")));
    }
    if let Some(rest) = p.strip_prefix('@') {
        return Ok(match find_top_level_eq(rest) {
            Some(eq) => Predicate::AttrEquals(rest[..eq].trim().to_string(), strip_quotes(rest[eq + 1..].trim())?),
            None => Predicate::AttrExists(rest.trim().to_string()),
        });
    }
    Ok(match find_top_level_eq(p) {
        Some(eq) => Predicate::ChildEquals(p[..eq].trim().to_string(), strip_quotes(p[eq + 1..].trim())?),
        None => Predicate::ChildExists(p.to_string()),
    })
}

fn find_top_level_eq(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '=' => return Some(i),
            _ => {}
        }
    }
    None
}

fn strip_quotes(s: &str) -> Result<String, XPathError> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0] {
        Ok(s[1..s.len() - 1].to_string())
    } else {
        Err(XPathError::new(format!("expected a quoted string literal, got {s:?}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::{parse as parse_xml, ParserOptions};

    #[test]
    fn absolute_child_path_finds_nested_element() {
        let doc = parse_xml("<a><b><c/></b></a>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        let items = evaluate(&doc, root, "/a/b/c", &ctx).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn descendant_shortcut_finds_all_matching_elements() {
        let doc = parse_xml("<a><b><c/></b><c/></a>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        let items = evaluate(&doc, root, "//c", &ctx).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn attribute_axis_selects_attribute_values() {
        let doc = parse_xml(r#"<a x="1"/>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        assert_eq!(texts(&doc, root, "/a/@x", &ctx).unwrap(), vec!["1".to_string()]);
    }

    #[test]
    fn attr_equals_predicate_filters_elements() {
        let doc = parse_xml(r#"<r><a x="1"/><a x="2"/></r>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        let items = evaluate(&doc, root, "/r/a[@x='2']", &ctx).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn position_predicate_selects_by_index() {
        let doc = parse_xml("<r><a/><a/><a/></r>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        let items = evaluate(&doc, root, "/r/a[2]", &ctx).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn prefixed_name_test_requires_namespace_match() {
        let doc = parse_xml(r#"<r xmlns:p="urn:p"><p:a/><a/></r>"#, ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new().with_namespace("p", "urn:p");
        let items = evaluate(&doc, root, "/r/p:a", &ctx).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn unrecognised_axis_syntax_is_permissive_not_an_error() {
        let doc = parse_xml("<r><a/></r>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        let ctx = XPathContext::new();
        let items = evaluate(&doc, root, "/r/nonexistent", &ctx).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn unclosed_bracket_is_a_syntax_error() {
        let ctx = XPathContext::new();
        let doc = parse_xml("<r/>", ParserOptions::default()).unwrap();
        let root = doc.root_element().unwrap();
        assert!(evaluate(&doc, root, "/r/a[1", &ctx).is_err());
    }
}
