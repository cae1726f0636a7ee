// crates/orchestra-transposer/src/orchestra/mod.rs

//! The FIX Orchestra repository dialect: codecs for versions 1.0 and 1.1
//! plus the instance views translators operate on.

mod instance;

pub use instance::{
    OrchestraInstance10, OrchestraInstance11, Repository, append_documentation,
    append_to_structure, component_refs, documentation, documentation_text, field_refs,
    group_refs, structure,
};

use std::io::{BufRead, Write};

use crate::error::TransposerError;
use crate::sbe;
use crate::xml::{self, DialectSchema, NamespaceDecl};

/// Orchestra 1.0 repository namespace.
pub const REPOSITORY_NS_V1_0: &str = "http://fixprotocol.io/2020/orchestra/repository";
/// Orchestra 1.1 repository namespace.
pub const REPOSITORY_NS_V1_1: &str = "http://fixprotocol.io/2023/orchestra/repository";
/// Dublin Core terms namespace used in repository metadata.
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
/// Dublin Core elements namespace used in repository metadata.
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

static ORCH10_SCHEMA: DialectSchema = DialectSchema {
    root: "fixr:repository",
    namespaces: &[
        NamespaceDecl {
            uri: REPOSITORY_NS_V1_0,
            canonical: "fixr",
            write_prefix: Some("fixr"),
            declare_if_used: false,
        },
        NamespaceDecl {
            uri: DCTERMS_NS,
            canonical: "dcterms",
            write_prefix: Some("dcterms"),
            declare_if_used: false,
        },
        NamespaceDecl {
            uri: DC_NS,
            canonical: "dc",
            write_prefix: Some("dc"),
            declare_if_used: false,
        },
        // Embedded SBE type extensions inside mappedDatatype elements.
        NamespaceDecl {
            uri: sbe::MESSAGE_SCHEMA_NS_V1_0,
            canonical: "sbe",
            write_prefix: Some("sbe"),
            declare_if_used: true,
        },
    ],
    qualified_locals: &[],
};

static ORCH11_SCHEMA: DialectSchema = DialectSchema {
    root: "fixr:repository",
    namespaces: &[
        NamespaceDecl {
            uri: REPOSITORY_NS_V1_1,
            canonical: "fixr",
            write_prefix: Some("fixr"),
            declare_if_used: false,
        },
        NamespaceDecl {
            uri: DCTERMS_NS,
            canonical: "dcterms",
            write_prefix: Some("dcterms"),
            declare_if_used: false,
        },
        NamespaceDecl {
            uri: DC_NS,
            canonical: "dc",
            write_prefix: Some("dc"),
            declare_if_used: false,
        },
        NamespaceDecl {
            uri: sbe::MESSAGE_SCHEMA_NS_V1_0,
            canonical: "sbe",
            write_prefix: Some("sbe"),
            declare_if_used: true,
        },
    ],
    qualified_locals: &[],
};

/// Codec for FIX Orchestra version 1.0 documents.
pub struct Orchestra10;

impl Orchestra10 {
    /// Decodes a document into an instance plus lax-validation findings.
    pub fn read_xml<R: BufRead>(
        input: R,
    ) -> Result<(OrchestraInstance10, Vec<TransposerError>), TransposerError> {
        let (root, errors) = xml::read_document(input, &ORCH10_SCHEMA)?;
        Ok((OrchestraInstance10::from_root(root), errors))
    }

    /// Encodes an instance to a stream.
    pub fn write_xml<W: Write>(
        instance: &OrchestraInstance10,
        out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        xml::write_document(instance.root(), &ORCH10_SCHEMA, out)
    }

    /// Decodes a document and returns only its findings.
    pub fn validate<R: BufRead>(input: R) -> Result<Vec<TransposerError>, TransposerError> {
        Self::read_xml(input).map(|(_, errors)| errors)
    }
}

/// Codec for FIX Orchestra version 1.1 documents (upgrade target).
pub struct Orchestra11;

impl Orchestra11 {
    /// Decodes a document into an instance plus lax-validation findings.
    pub fn read_xml<R: BufRead>(
        input: R,
    ) -> Result<(OrchestraInstance11, Vec<TransposerError>), TransposerError> {
        let (root, errors) = xml::read_document(input, &ORCH11_SCHEMA)?;
        Ok((OrchestraInstance11::from_root(root), errors))
    }

    /// Encodes an instance to a stream.
    pub fn write_xml<W: Write>(
        instance: &OrchestraInstance11,
        out: W,
    ) -> Result<Vec<TransposerError>, TransposerError> {
        xml::write_document(instance.root(), &ORCH11_SCHEMA, out)
    }

    /// Decodes a document and returns only its findings.
    pub fn validate<R: BufRead>(input: R) -> Result<Vec<TransposerError>, TransposerError> {
        Self::read_xml(input).map(|(_, errors)| errors)
    }
}
