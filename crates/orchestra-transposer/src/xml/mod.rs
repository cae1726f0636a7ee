// crates/orchestra-transposer/src/xml/mod.rs

//! Generic, order-preserving XML document tree and its codec.
//!
//! Every dialect shares one in-memory representation: a [`Node`] tree whose
//! attribute and child order are the literal document order. The reader and
//! writer translate between that tree and XML text, canonicalizing namespace
//! prefixes on the way in and re-declaring them on the way out, so the
//! dialect views and translators never deal with namespaces themselves.

mod node;
mod reader;
mod writer;

pub use node::{AttrValue, Node};
pub use reader::read_document;
pub use writer::write_document;

/// One namespace of a dialect.
#[derive(Debug)]
pub struct NamespaceDecl {
    /// Namespace URI as it appears in documents.
    pub uri: &'static str,
    /// Canonical prefix used for node names in the decoded tree.
    /// Empty means elements of this namespace keep their bare local name.
    pub canonical: &'static str,
    /// Prefix to declare and use on output; `None` declares the namespace
    /// as the default (`xmlns=`) and writes bare local names.
    pub write_prefix: Option<&'static str>,
    /// Declare the namespace on the root only when the tree actually
    /// contains an element carrying its canonical prefix.
    pub declare_if_used: bool,
}

/// Static description of a dialect's document shape.
#[derive(Debug)]
pub struct DialectSchema {
    /// Canonical name of the document root element.
    pub root: &'static str,
    /// Namespaces the dialect declares.
    pub namespaces: &'static [NamespaceDecl],
    /// Local names that must be prefix-qualified on output even though the
    /// decoded tree keeps them bare (SBE 1.0 qualifies only `messageSchema`
    /// and `message`; everything else in the document is unqualified).
    pub qualified_locals: &'static [&'static str],
}
