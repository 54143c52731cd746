//! A from-scratch XML toolkit: a namespace-aware DOM parser and its
//! streaming (SAX-like) counterpart, a serializer, an XPath 1.0 subset, and
//! Exclusive C14N canonicalization, all sharing one lexer and one namespace
//! resolution implementation.

mod c14n;
mod dom;
mod error;
mod lexer;
mod namespace;
mod parser;
mod serializer;
mod stream;
mod xpath;

pub use c14n::{canonicalize, C14nOptions};
pub use dom::{Attribute, Document, Element, NamespaceDecl, NodeId, NodeKind, XmlDeclaration};
pub use error::{Position, XPathError, XmlError};
pub use parser::{parse, ParserOptions};
pub use serializer::{serialize, Newline, SerializerOptions};
pub use stream::{Event, StreamReader};
pub use xpath::{evaluate, first, texts, XPathContext, XPathItem};
